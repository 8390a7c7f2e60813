//! Application state.
//!
//! `App::new` is the composition root: config, then the API client built
//! from it, then the restored auth session, then list-selection state.
//! Everything is constructed once at startup and torn down on exit.

use anyhow::Result;
use crossterm::event::KeyCode;

use trailpack_api::{PackDetailResponse, PackSummary, TripSummary, UserSummary};
use trailpack_api_client::ApiClient;

use crate::config::{self, TuiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Packs,
    Trips,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    PackList,
    PackDetail,
    TripList,
    Settings,
}

/// One destination in the navigation list.
pub struct NavItem {
    pub label: String,
    pub tab: Tab,
    pub count: Option<usize>,
}

pub struct App {
    pub config: TuiConfig,
    pub client: ApiClient,
    runtime: tokio::runtime::Runtime,
    /// The signed-in user, when the stored token still verifies.
    pub session_user: Option<UserSummary>,
    pub active_tab: Tab,
    pub view: View,
    pub packs: Vec<PackSummary>,
    pub pack_detail: Option<PackDetailResponse>,
    pub trips: Vec<TripSummary>,
    pub selected_pack: usize,
    pub selected_trip: usize,
    pub flash: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: TuiConfig) -> Result<Self> {
        let server_url = config::resolve_server_url(&config);
        let mut client = ApiClient::new(&server_url, std::time::Duration::from_secs(10))?;
        if !config.auth_token.is_empty() {
            client.set_auth(config.auth_token.clone());
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        Ok(Self {
            config,
            client,
            runtime,
            session_user: None,
            active_tab: Tab::Packs,
            view: View::PackList,
            packs: Vec::new(),
            pack_detail: None,
            trips: Vec::new(),
            selected_pack: 0,
            selected_trip: 0,
            flash: None,
            should_quit: false,
        })
    }

    /// Restore the auth session and load both listings.
    pub fn refresh(&mut self) {
        if self.client.auth_token().is_some() {
            self.session_user = self.runtime.block_on(self.client.me()).ok();
        }
        match self.runtime.block_on(self.client.list_packs(None)) {
            Ok(resp) => {
                self.packs = resp.packs;
                self.selected_pack = self.selected_pack.min(self.packs.len().saturating_sub(1));
            }
            Err(e) => self.flash = Some(format!("failed to load packs: {e}")),
        }
        match self.runtime.block_on(self.client.list_trips()) {
            Ok(resp) => {
                self.trips = resp.trips;
                self.selected_trip = self.selected_trip.min(self.trips.len().saturating_sub(1));
            }
            Err(e) => self.flash = Some(format!("failed to load trips: {e}")),
        }
    }

    /// Destinations for the navigation list, in render order.
    pub fn navigation_items(&self) -> Vec<NavItem> {
        vec![
            NavItem {
                label: "Packs".to_string(),
                tab: Tab::Packs,
                count: Some(self.packs.len()),
            },
            NavItem {
                label: "Trips".to_string(),
                tab: Tab::Trips,
                count: Some(self.trips.len()),
            },
            NavItem {
                label: "Settings".to_string(),
                tab: Tab::Settings,
                count: None,
            },
        ]
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.view = match tab {
            Tab::Packs => View::PackList,
            Tab::Trips => View::TripList,
            Tab::Settings => View::Settings,
        };
        self.pack_detail = None;
    }

    fn next_tab(&mut self) {
        let next = match self.active_tab {
            Tab::Packs => Tab::Trips,
            Tab::Trips => Tab::Settings,
            Tab::Settings => Tab::Packs,
        };
        self.switch_tab(next);
    }

    fn select_delta(&mut self, delta: i64) {
        match self.view {
            View::PackList => {
                self.selected_pack = step(self.selected_pack, delta, self.packs.len());
            }
            View::TripList => {
                self.selected_trip = step(self.selected_trip, delta, self.trips.len());
            }
            _ => {}
        }
    }

    /// Open the selected pack's detail view.
    fn open_selected_pack(&mut self) {
        let Some(pack) = self.packs.get(self.selected_pack) else {
            return;
        };
        match self.runtime.block_on(self.client.get_pack(&pack.id)) {
            Ok(detail) => {
                self.pack_detail = Some(detail);
                self.view = View::PackDetail;
            }
            Err(e) => self.flash = Some(format!("failed to load pack: {e}")),
        }
    }

    fn back(&mut self) {
        if self.view == View::PackDetail {
            self.view = View::PackList;
            self.pack_detail = None;
        }
    }

    pub fn on_key(&mut self, key: KeyCode) {
        self.flash = None;
        match key {
            KeyCode::Char('q') => {
                if self.view == View::PackDetail {
                    self.back();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Esc => self.back(),
            KeyCode::Char('1') => self.switch_tab(Tab::Packs),
            KeyCode::Char('2') => self.switch_tab(Tab::Trips),
            KeyCode::Char('3') => self.switch_tab(Tab::Settings),
            KeyCode::Tab => self.next_tab(),
            KeyCode::Char('j') | KeyCode::Down => self.select_delta(1),
            KeyCode::Char('k') | KeyCode::Up => self.select_delta(-1),
            KeyCode::Enter => {
                if self.view == View::PackList {
                    self.open_selected_pack();
                }
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }
}

fn step(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta;
    next.clamp(0, len as i64 - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(TuiConfig::default()).expect("app")
    }

    fn pack(id: &str, name: &str) -> PackSummary {
        PackSummary {
            id: id.into(),
            name: name.into(),
            owner_id: "u1".into(),
            is_public: true,
            total_weight: 0.0,
            total_score: 0.0,
            favorites_count: 0,
            created_at: "2026-08-01 00:00:00".into(),
        }
    }

    #[test]
    fn tab_keys_switch_views() {
        let mut app = app();
        app.on_key(KeyCode::Char('2'));
        assert_eq!(app.active_tab, Tab::Trips);
        assert_eq!(app.view, View::TripList);

        app.on_key(KeyCode::Tab);
        assert_eq!(app.active_tab, Tab::Settings);
        assert_eq!(app.view, View::Settings);

        app.on_key(KeyCode::Tab);
        assert_eq!(app.active_tab, Tab::Packs);
    }

    #[test]
    fn selection_clamps_to_list_bounds() {
        let mut app = app();
        app.packs = vec![pack("p1", "A"), pack("p2", "B")];

        app.on_key(KeyCode::Char('k'));
        assert_eq!(app.selected_pack, 0);
        app.on_key(KeyCode::Char('j'));
        app.on_key(KeyCode::Char('j'));
        app.on_key(KeyCode::Char('j'));
        assert_eq!(app.selected_pack, 1);
    }

    #[test]
    fn selection_on_empty_list_stays_at_zero() {
        let mut app = app();
        app.on_key(KeyCode::Down);
        assert_eq!(app.selected_pack, 0);
    }

    #[test]
    fn q_quits_from_list_but_backs_out_of_detail() {
        let mut app = app();
        app.view = View::PackDetail;
        app.on_key(KeyCode::Char('q'));
        assert_eq!(app.view, View::PackList);
        assert!(!app.should_quit);

        app.on_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn navigation_items_carry_counts() {
        let mut app = app();
        app.packs = vec![pack("p1", "A")];
        let items = app.navigation_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].count, Some(1));
        assert_eq!(items[2].count, None);
    }
}
