use axum::{extract::State, Json};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use trailpack_api::{
    db as dbq, service, AppendMessageRequest, ConversationListResponse, ConversationMessage,
    ConversationResponse,
};

use crate::error::ApiErr;
use crate::routes::auth::{now_unix, AuthUser};
use crate::storage::{conversation_from_row, sq_execute, sq_query_map, sq_query_row, Db};

/// GET /api/conversations — the caller's assistant history, newest first.
pub async fn list_conversations(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<ConversationListResponse>, ApiErr> {
    let conn = db.conn();
    let conversations = sq_query_map(
        &conn,
        dbq::conversations::list_for_user(&user.user_id),
        conversation_from_row,
    )
    .map_err(ApiErr::from_db("list conversations"))?;
    Ok(Json(ConversationListResponse { conversations }))
}

/// POST /api/conversations — append a message; omitting the id starts a
/// new conversation.
pub async fn append_message(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<AppendMessageRequest>,
) -> Result<Json<ConversationResponse>, ApiErr> {
    if req.message.trim().is_empty() {
        return Err(ApiErr::bad_request("message must not be empty"));
    }
    let now = service::sqlite_datetime(now_unix()).map_err(ApiErr::from)?;
    let entry = ConversationMessage {
        role: req.role.clone().unwrap_or_else(|| "user".to_string()),
        content: req.message.clone(),
        timestamp: now.clone(),
    };

    let conn = db.conn();

    let existing = match req.conversation_id {
        Some(ref id) => sq_query_row(
            &conn,
            dbq::conversations::get_for_user(id, &user.user_id),
            conversation_from_row,
        )
        .optional()
        .map_err(ApiErr::from_db("conversation lookup"))?,
        None => None,
    };

    let conversation_id = match existing {
        Some(mut conversation) => {
            conversation.history.push(entry);
            let history = serde_json::to_string(&conversation.history)
                .map_err(ApiErr::from_db("encode history"))?;
            sq_execute(
                &conn,
                dbq::conversations::update_history(&conversation.id, &history, &now),
            )
            .map_err(ApiErr::from_db("append message"))?;
            conversation.id
        }
        None => {
            if req.conversation_id.is_some() {
                return Err(ApiErr::not_found("conversation not found"));
            }
            let id = Uuid::new_v4().to_string();
            let history =
                serde_json::to_string(&[&entry]).map_err(ApiErr::from_db("encode history"))?;
            sq_execute(&conn, dbq::conversations::insert(&id, &user.user_id, &history))
                .map_err(ApiErr::from_db("create conversation"))?;
            id
        }
    };

    let conversation = sq_query_row(
        &conn,
        dbq::conversations::get_for_user(&conversation_id, &user.user_id),
        conversation_from_row,
    )
    .map_err(ApiErr::from_db("load conversation"))?;

    Ok(Json(conversation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;

    fn seed_user(conn: &rusqlite::Connection, id: &str, email: &str) {
        sq_execute(
            conn,
            dbq::users::insert_with_password(id, "hiker", email, "h", "s"),
        )
        .unwrap();
    }

    #[test]
    fn history_appends_in_order() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed_user(&conn, "u1", "a@example.com");

        let history = serde_json::to_string(&[ConversationMessage {
            role: "user".into(),
            content: "what should I pack?".into(),
            timestamp: "2026-08-01 10:00:00".into(),
        }])
        .unwrap();
        sq_execute(&conn, dbq::conversations::insert("c1", "u1", &history)).unwrap();

        let mut conversation = sq_query_row(
            &conn,
            dbq::conversations::get_for_user("c1", "u1"),
            conversation_from_row,
        )
        .unwrap();
        conversation.history.push(ConversationMessage {
            role: "assistant".into(),
            content: "start with shelter and water".into(),
            timestamp: "2026-08-01 10:00:05".into(),
        });
        let updated = serde_json::to_string(&conversation.history).unwrap();
        sq_execute(
            &conn,
            dbq::conversations::update_history("c1", &updated, "2026-08-01 10:00:05"),
        )
        .unwrap();

        let reloaded = sq_query_row(
            &conn,
            dbq::conversations::get_for_user("c1", "u1"),
            conversation_from_row,
        )
        .unwrap();
        assert_eq!(reloaded.history.len(), 2);
        assert_eq!(reloaded.history[1].role, "assistant");
    }

    #[test]
    fn conversations_are_scoped_to_their_owner() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed_user(&conn, "u1", "a@example.com");
        seed_user(&conn, "u2", "b@example.com");

        sq_execute(&conn, dbq::conversations::insert("c1", "u1", "[]")).unwrap();

        let theirs = sq_query_row(
            &conn,
            dbq::conversations::get_for_user("c1", "u2"),
            conversation_from_row,
        )
        .optional()
        .unwrap();
        assert!(theirs.is_none());
    }

    #[test]
    fn corrupt_history_decodes_as_empty() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();
        seed_user(&conn, "u1", "a@example.com");

        sq_execute(&conn, dbq::conversations::insert("c1", "u1", "not json")).unwrap();
        let conversation = sq_query_row(
            &conn,
            dbq::conversations::get_for_user("c1", "u1"),
            conversation_from_row,
        )
        .unwrap();
        assert!(conversation.history.is_empty());
    }
}
