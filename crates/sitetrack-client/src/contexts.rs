use std::sync::Arc;

use sitetrack_api::ApiClient;
use sitetrack_core::building::{Building, Level};
use sitetrack_core::project::Project;
use sitetrack_core::step::StepDescriptor;
use sitetrack_state::{DesignFormStore, LocationContext, ProjectContext, SessionContext};
use sitetrack_store::SnapshotStore;
use tracing::{info, warn};

use crate::{next_screen_for_step, FlowError, Screen};

/// Outcome of a session-validity check. Never mutates the token; the UI
/// decides whether to show a banner or force a re-login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    /// Token rejected or flagged invalid; the message is user-visible.
    Warning(String),
}

/// The injected context bundle: one per app instance, handed down from
/// the composition root instead of living in globals.
#[derive(Clone)]
pub struct ClientContexts {
    pub session: SessionContext,
    pub project: ProjectContext,
    pub location: LocationContext,
    pub forms: DesignFormStore,
    api: Arc<ApiClient>,
}

impl ClientContexts {
    /// Rehydrate every context from the snapshot store and wire the API
    /// client to the restored token.
    pub async fn load(store: Arc<dyn SnapshotStore>, api: Arc<ApiClient>) -> Self {
        let session = SessionContext::load(store.clone()).await;
        api.set_token(session.token());
        Self {
            session,
            project: ProjectContext::load(store.clone()).await,
            location: LocationContext::load(store.clone()).await,
            forms: DesignFormStore::load(store).await,
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // -- Session flows --

    pub async fn login(&self, token: String) {
        self.api.set_token(Some(token.clone()));
        self.session.login(token).await;
    }

    /// Log out and cascade: the session primitive itself only drops the
    /// token, so the cross-context reset happens here, explicitly.
    /// Design-form drafts survive logout; they belong to the device,
    /// not the session.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.api.set_token(None);
        self.clear_project_data().await;
    }

    /// Poll the validity endpoint. Failures and `valid:false` both
    /// degrade to a warning; the token is left untouched either way.
    pub async fn check_session(&self) -> SessionStatus {
        match self.api.validate_session().await {
            Ok(validity) if validity.valid => SessionStatus::Valid,
            Ok(validity) => SessionStatus::Warning(
                validity
                    .message
                    .unwrap_or_else(|| "session no longer valid".into()),
            ),
            Err(e) => {
                warn!("session validity check failed: {e}");
                SessionStatus::Warning(e.to_string())
            }
        }
    }

    /// Spawn a background task that re-checks validity on an interval
    /// and hands each warning to `on_warning` (a toast, a banner).
    /// The poll never logs the user out; cancel by aborting the handle.
    pub fn spawn_session_poll(
        &self,
        interval: std::time::Duration,
        on_warning: impl Fn(String) + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        let ctx = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                // Anonymous sessions have nothing to validate; checking
                // anyway would raise a 401 warning every interval.
                if !ctx.session.is_authenticated() {
                    continue;
                }
                if let SessionStatus::Warning(msg) = ctx.check_session().await {
                    on_warning(msg);
                }
            }
        })
    }

    // -- Project flows --

    /// Switch to a project: reset the previous selection graph, record
    /// the choice, then fetch the overview and phase cards. The card
    /// fetch is generation-guarded, so a slower fetch for a previously
    /// selected project can never overwrite this one's cards; when the
    /// commit lands, the head card is promoted as the default step.
    pub async fn select_project(&self, project: &Project) -> Result<(), FlowError> {
        self.clear_project_data().await;
        self.project
            .set_selected_project_id(Some(project.id.clone()))
            .await;

        let overview = self.api.project_overview(&project.id).await?;
        self.project.set_project_data(Some(overview)).await;

        let gen = self.project.begin_step_fetch();
        let cards = self.api.list_step_cards(&project.id).await?;
        if self.project.commit_step_types(gen, cards).await {
            self.project.promote_first_step_as_default().await;
            info!("selected project {} ({} cards)", project.id, self.project.step_types().len());
        }
        Ok(())
    }

    /// Re-fetch the phase cards for the current project. Returns whether
    /// the result was committed (false when superseded mid-flight or no
    /// project is selected).
    pub async fn refresh_step_cards(&self) -> Result<bool, FlowError> {
        let project_id = self
            .project
            .selected_project_id()
            .ok_or(FlowError::NoSelection("project"))?;
        let gen = self.project.begin_step_fetch();
        let cards = self.api.list_step_cards(&project_id).await?;
        Ok(self.project.commit_step_types(gen, cards).await)
    }

    /// Record a tapped phase card as the active step and say where to
    /// navigate next.
    pub async fn enter_step(&self, step: &StepDescriptor) -> Screen {
        self.project
            .set_selected_step_type(Some(step.step_type.clone()))
            .await;
        self.project
            .set_selected_step_id(Some(step.step_id.clone()))
            .await;
        next_screen_for_step(step)
    }

    /// Buildings for the active project/step pair, for the drill-down
    /// modal.
    pub async fn fetch_buildings(&self) -> Result<Vec<Building>, FlowError> {
        let project_id = self
            .project
            .selected_project_id()
            .ok_or(FlowError::NoSelection("project"))?;
        let step_id = self
            .project
            .selected_step_id()
            .ok_or(FlowError::NoSelection("step"))?;
        Ok(self.api.list_buildings(&project_id, &step_id).await?)
    }

    /// Levels of the selected building, for the second tier of the
    /// drill-down modal.
    pub async fn fetch_levels(&self) -> Result<Vec<Level>, FlowError> {
        let building_id = self
            .location
            .current_location()
            .building_id
            .ok_or(FlowError::NoSelection("building"))?;
        Ok(self.api.list_levels(&building_id).await?)
    }

    /// The one full-graph reset: project id/data, step types, step
    /// selection, design id, and the entire location context.
    pub async fn clear_project_data(&self) {
        self.project.clear_project_data().await;
        self.location.clear_location_data().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitetrack_core::step::StepKind;
    use sitetrack_store::MemoryStore;

    fn descriptor(step_type: &str, step_id: &str, kind: StepKind) -> StepDescriptor {
        StepDescriptor {
            step_type: step_type.into(),
            step_id: step_id.into(),
            record_id: format!("rec-{step_id}"),
            name: step_type.into(),
            kind,
            order: 0,
            completed_count: 0,
            last_week_count: 0,
        }
    }

    async fn contexts() -> ClientContexts {
        // Port 9 (discard) — none of these tests touch the network.
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9"));
        ClientContexts::load(Arc::new(MemoryStore::new()), api).await
    }

    #[tokio::test]
    async fn login_wires_token_into_api_client() {
        let ctx = contexts().await;
        assert!(!ctx.api().has_token());
        ctx.login("tok-1".into()).await;
        assert!(ctx.session.is_authenticated());
        assert!(ctx.api().has_token());
    }

    #[tokio::test]
    async fn restored_token_reaches_api_client() {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let first = ClientContexts::load(
            store.clone(),
            Arc::new(ApiClient::new("http://127.0.0.1:9")),
        )
        .await;
        first.login("tok-1".into()).await;

        let second =
            ClientContexts::load(store, Arc::new(ApiClient::new("http://127.0.0.1:9"))).await;
        assert!(second.api().has_token());
    }

    #[tokio::test]
    async fn logout_cascades_but_keeps_form_drafts() {
        let ctx = contexts().await;
        ctx.login("tok-1".into()).await;
        ctx.project
            .set_selected_project_id(Some("p1".into()))
            .await;
        ctx.location
            .set_selected_building(Some("b1".into()), None)
            .await;
        ctx.forms
            .add_form(sitetrack_core::design_form::CreateDesignForm {
                task_id: "t1".into(),
                ..Default::default()
            })
            .await;

        ctx.logout().await;

        assert!(!ctx.session.is_authenticated());
        assert!(!ctx.api().has_token());
        assert_eq!(ctx.project.selected_project_id(), None);
        assert!(ctx.location.current_location().is_empty());
        assert!(ctx.forms.form_by_task_id("t1").is_some());
    }

    #[tokio::test]
    async fn clear_project_data_resets_the_whole_graph() {
        let ctx = contexts().await;
        ctx.project
            .set_selected_project_id(Some("p1".into()))
            .await;
        ctx.project
            .set_project_data(Some(serde_json::json!({"name": "Tower A"})))
            .await;
        ctx.project
            .set_project_step_types(vec![descriptor("design", "s1", StepKind::Step)])
            .await;
        ctx.project.promote_first_step_as_default().await;
        ctx.project.set_design_id(Some("d1".into())).await;
        ctx.location
            .set_selected_building(Some("b1".into()), Some("Tower A".into()))
            .await;
        ctx.location
            .set_selected_level(Some("l1".into()), Some("Level 1".into()))
            .await;
        ctx.location.set_selected_unit_name(Some("101".into())).await;

        ctx.clear_project_data().await;

        assert_eq!(ctx.project.selected_project_id(), None);
        assert_eq!(ctx.project.project_data(), None);
        assert!(ctx.project.step_types().is_empty());
        assert_eq!(ctx.project.selected_step_type(), None);
        assert_eq!(ctx.project.selected_step_id(), None);
        assert_eq!(ctx.project.design_id(), None);
        let loc = ctx.location.current_location();
        assert_eq!(loc.building_id, None);
        assert_eq!(loc.building_name, None);
        assert_eq!(loc.level_id, None);
        assert_eq!(loc.level_name, None);
        assert_eq!(loc.unit_name, None);
    }

    #[tokio::test]
    async fn enter_step_routes_by_kind() {
        let ctx = contexts().await;
        let plain = descriptor("design", "s1", StepKind::Step);
        let multi = descriptor("finish", "s2", StepKind::MultiStep);

        assert_eq!(ctx.enter_step(&plain).await, Screen::TaskList);
        assert_eq!(ctx.project.selected_step_id().as_deref(), Some("s1"));

        assert_eq!(ctx.enter_step(&multi).await, Screen::DrillDown);
        assert_eq!(ctx.project.selected_step_type().as_deref(), Some("finish"));
    }

    #[tokio::test]
    async fn fetch_buildings_without_selection_is_a_flow_error() {
        let ctx = contexts().await;
        match ctx.fetch_buildings().await {
            Err(FlowError::NoSelection("project")) => {}
            other => panic!("unexpected result: {other:?}"),
        }

        ctx.project
            .set_selected_project_id(Some("p1".into()))
            .await;
        match ctx.fetch_buildings().await {
            Err(FlowError::NoSelection("step")) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_poll_reports_warning_and_keeps_token() {
        let ctx = contexts().await;
        ctx.login("tok-1".into()).await;

        // Unreachable server: every check degrades to a warning.
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = ctx.spawn_session_poll(std::time::Duration::from_millis(5), move |msg| {
            let _ = tx.send(msg);
        });

        let msg = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("poll produced no warning")
            .unwrap();
        assert!(!msg.is_empty());
        assert!(ctx.session.is_authenticated());
        handle.abort();
    }

    #[tokio::test]
    async fn session_poll_stays_quiet_while_anonymous() {
        let ctx = contexts().await;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = ctx.spawn_session_poll(std::time::Duration::from_millis(2), move |msg| {
            let _ = tx.send(msg);
        });

        // No token: several intervals must pass without a warning.
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
        assert!(rx.try_recv().is_err());
        handle.abort();
    }

    #[tokio::test]
    async fn fetch_levels_without_building_is_a_flow_error() {
        let ctx = contexts().await;
        assert!(matches!(
            ctx.fetch_levels().await,
            Err(FlowError::NoSelection("building"))
        ));
    }

    #[tokio::test]
    async fn refresh_without_project_is_a_flow_error() {
        let ctx = contexts().await;
        assert!(matches!(
            ctx.refresh_step_cards().await,
            Err(FlowError::NoSelection("project"))
        ));
    }

    #[tokio::test]
    async fn contexts_survive_restart_over_local_store() {
        use sitetrack_store::{LocalStore, StoreConfig};

        let tmp = tempfile::tempdir().unwrap();
        let local = |dir: &std::path::Path| -> Arc<dyn SnapshotStore> {
            Arc::new(LocalStore::new(&StoreConfig {
                data_dir: Some(dir.to_string_lossy().to_string()),
                ephemeral: false,
            }))
        };

        {
            let ctx = ClientContexts::load(
                local(tmp.path()),
                Arc::new(ApiClient::new("http://127.0.0.1:9")),
            )
            .await;
            ctx.login("tok-1".into()).await;
            ctx.project
                .set_selected_project_id(Some("p1".into()))
                .await;
            ctx.enter_step(&descriptor("design", "s1", StepKind::Step))
                .await;
        }

        let ctx = ClientContexts::load(
            local(tmp.path()),
            Arc::new(ApiClient::new("http://127.0.0.1:9")),
        )
        .await;
        assert!(ctx.session.is_authenticated());
        assert!(ctx.api().has_token());
        assert_eq!(ctx.project.selected_project_id().as_deref(), Some("p1"));
        assert_eq!(ctx.project.selected_step_id().as_deref(), Some("s1"));
    }
}
