use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use trailpack_api::{
    db as dbq, CreateTemplateRequest, MsgResponse, TemplateKind, TemplateListResponse,
    TemplateResponse,
};

use crate::error::ApiErr;
use crate::routes::auth::{AuthUser, MaybeUser};
use crate::storage::{item_from_row, pack_from_row, sq_execute, sq_query_map, sq_query_row, template_from_row, Db};

/// GET /api/templates — global templates plus the caller's own.
pub async fn list_templates(
    State(db): State<Db>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<TemplateListResponse>, ApiErr> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    let conn = db.conn();
    let templates = sq_query_map(&conn, dbq::templates::list_visible(viewer), template_from_row)
        .map_err(ApiErr::from_db("list templates"))?;
    Ok(Json(TemplateListResponse { templates }))
}

/// POST /api/templates — cut a template from an existing pack or item.
/// Only admins may publish global templates.
pub async fn create_template(
    State(db): State<Db>,
    user: AuthUser,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiErr> {
    let is_global = req.is_global.unwrap_or(false);
    if is_global && user.role != "admin" {
        return Err(ApiErr::forbidden("only admins can publish global templates"));
    }

    let conn = db.conn();

    let source_exists = match req.kind {
        TemplateKind::Pack => sq_query_row(&conn, dbq::packs::get_by_id(&req.source_id), pack_from_row)
            .optional()
            .map_err(ApiErr::from_db("template source lookup"))?
            .is_some(),
        TemplateKind::Item => sq_query_row(&conn, dbq::items::get_by_id(&req.source_id), item_from_row)
            .optional()
            .map_err(ApiErr::from_db("template source lookup"))?
            .is_some(),
    };
    if !source_exists {
        return Err(ApiErr::not_found("template source not found"));
    }

    let template_id = Uuid::new_v4().to_string();
    sq_execute(
        &conn,
        dbq::templates::insert(
            &template_id,
            req.kind.as_str(),
            &req.source_id,
            is_global,
            &user.user_id,
        ),
    )
    .map_err(ApiErr::from_db("create template"))?;

    let template = sq_query_row(&conn, dbq::templates::get_by_id(&template_id), template_from_row)
        .map_err(ApiErr::from_db("load created template"))?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// DELETE /api/templates/:id — creator (or an admin) only.
pub async fn delete_template(
    State(db): State<Db>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MsgResponse>, ApiErr> {
    let conn = db.conn();

    let template = sq_query_row(&conn, dbq::templates::get_by_id(&id), template_from_row)
        .map_err(|_| ApiErr::not_found("template not found"))?;

    let is_creator = template.created_by.as_deref() == Some(user.user_id.as_str());
    if !is_creator && user.role != "admin" {
        return Err(ApiErr::forbidden("not the template creator"));
    }

    sq_execute(&conn, dbq::templates::delete(&id)).map_err(ApiErr::from_db("delete template"))?;

    Ok(Json(MsgResponse {
        msg: "template deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init_memory_db;

    #[test]
    fn visibility_covers_global_and_own_templates() {
        let db = init_memory_db().unwrap();
        let conn = db.conn();

        sq_execute(
            &conn,
            dbq::users::insert_with_password("u1", "a", "a@example.com", "h", "s"),
        )
        .unwrap();
        sq_execute(
            &conn,
            dbq::users::insert_with_password("u2", "b", "b@example.com", "h", "s"),
        )
        .unwrap();
        sq_execute(&conn, dbq::packs::insert("p1", "Base", "u1", true)).unwrap();

        sq_execute(&conn, dbq::templates::insert("t1", "pack", "p1", true, "u1")).unwrap();
        sq_execute(&conn, dbq::templates::insert("t2", "pack", "p1", false, "u1")).unwrap();

        let guest = sq_query_map(&conn, dbq::templates::list_visible(None), template_from_row)
            .unwrap();
        assert_eq!(guest.len(), 1);

        let owner = sq_query_map(
            &conn,
            dbq::templates::list_visible(Some("u1")),
            template_from_row,
        )
        .unwrap();
        assert_eq!(owner.len(), 2);

        let other = sq_query_map(
            &conn,
            dbq::templates::list_visible(Some("u2")),
            template_from_row,
        )
        .unwrap();
        assert_eq!(other.len(), 1);
    }
}
