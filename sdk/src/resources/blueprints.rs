//! Blueprint registration and the build-completion wait.

use devgrid_api_types::{BlueprintListView, BlueprintStatus, BlueprintView, CreateBlueprintRequest};

use super::classify_poll_error;
use crate::error::{ApiError, Error};
use crate::http::Http;
use crate::polling::{PollOptions, poll};

/// Status operations the build waiter needs.
#[allow(async_fn_in_trait)]
pub trait BlueprintStatusSource {
    /// Fetch the blueprint.
    async fn retrieve(&self, id: &str) -> Result<BlueprintView, ApiError>;
}

/// Blueprint resource methods.
pub struct Blueprints<'a> {
    pub(crate) http: &'a Http,
}

impl Blueprints<'_> {
    /// Register a blueprint and kick off its image build.
    ///
    /// The returned view is usually still `provisioning`; follow with
    /// [`Blueprints::await_built`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn create(&self, request: &CreateBlueprintRequest) -> Result<BlueprintView, ApiError> {
        self.http.post("/v1/blueprints", request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the blueprint does not exist.
    pub async fn retrieve(&self, id: &str) -> Result<BlueprintView, ApiError> {
        self.http.get(&format!("/v1/blueprints/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<BlueprintView>, ApiError> {
        let view: BlueprintListView = self.http.get("/v1/blueprints").await?;
        Ok(view.blueprints)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, id: &str) -> Result<BlueprintView, ApiError> {
        self.http.delete(&format!("/v1/blueprints/{id}")).await
    }

    /// Wait for the blueprint build to finish successfully.
    ///
    /// # Errors
    ///
    /// See [`await_built`].
    pub async fn await_built(&self, id: &str) -> Result<BlueprintView, Error> {
        await_built(self, id, PollOptions::default()).await
    }

    /// Register a blueprint and wait for its build to finish.
    ///
    /// # Errors
    ///
    /// See [`Blueprints::create`] and [`await_built`].
    pub async fn create_and_await(
        &self,
        request: &CreateBlueprintRequest,
    ) -> Result<BlueprintView, Error> {
        let created = self.create(request).await?;
        await_built(self, &created.id, PollOptions::default()).await
    }
}

impl BlueprintStatusSource for Blueprints<'_> {
    async fn retrieve(&self, id: &str) -> Result<BlueprintView, ApiError> {
        Blueprints::retrieve(self, id).await
    }
}

/// Wait until the build leaves `{provisioning, building}`, then require
/// `build_complete`.
///
/// Any other resting state surfaces as [`Error::BlueprintBuildFailed`]
/// carrying the terminal status and the server-supplied failure reason — it
/// is never silently treated as success.
///
/// # Errors
///
/// Returns [`Error::BlueprintBuildFailed`] for a non-success resting state,
/// the wait-budget errors when polling gives up, and [`Error::Api`] for
/// request failures.
pub async fn await_built(
    api: &impl BlueprintStatusSource,
    id: &str,
    options: PollOptions<BlueprintView>,
) -> Result<BlueprintView, Error> {
    let options = options.stop_when(|b: &BlueprintView| {
        !matches!(
            b.status,
            BlueprintStatus::Provisioning | BlueprintStatus::Building
        )
    });

    let built = poll(|| api.retrieve(id), || api.retrieve(id), options)
        .await
        .map_err(|e| classify_poll_error("blueprint", id, e, |b| b.status.as_str()))?;

    match built.status {
        BlueprintStatus::BuildComplete => Ok(built),
        status => Err(Error::BlueprintBuildFailed {
            id: id.to_string(),
            status,
            reason: built.failure_reason,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    fn view(id: &str, status: BlueprintStatus, reason: Option<&str>) -> BlueprintView {
        BlueprintView {
            id: id.to_string(),
            name: "base-ci".to_string(),
            status,
            failure_reason: reason.map(str::to_string),
            created_at: None,
        }
    }

    fn fast_options() -> PollOptions<BlueprintView> {
        PollOptions::default()
            .with_initial_delay(Duration::ZERO)
            .with_interval(Duration::ZERO)
    }

    /// Stub serving a scripted sequence of statuses; the last entry repeats.
    struct ScriptedBlueprintApi {
        script: Vec<BlueprintView>,
        calls: AtomicU32,
    }

    impl ScriptedBlueprintApi {
        fn new(script: Vec<BlueprintView>) -> Self {
            Self {
                script,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl BlueprintStatusSource for ScriptedBlueprintApi {
        async fn retrieve(&self, _id: &str) -> Result<BlueprintView, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            let idx = n.min(self.script.len() - 1);
            Ok(self.script[idx].clone())
        }
    }

    #[tokio::test]
    async fn build_wait_returns_on_build_complete() {
        let api = ScriptedBlueprintApi::new(vec![
            view("bpt-1a2b3c", BlueprintStatus::Provisioning, None),
            view("bpt-1a2b3c", BlueprintStatus::Building, None),
            view("bpt-1a2b3c", BlueprintStatus::BuildComplete, None),
        ]);
        let built = await_built(&api, "bpt-1a2b3c", fast_options()).await.unwrap();
        assert_eq!(built.status, BlueprintStatus::BuildComplete);
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_build_is_not_treated_as_success() {
        let api = ScriptedBlueprintApi::new(vec![
            view("bpt-1a2b3c", BlueprintStatus::Building, None),
            view(
                "bpt-1a2b3c",
                BlueprintStatus::Failed,
                Some("dockerfile step 4 exited 1"),
            ),
        ]);
        let err = await_built(&api, "bpt-1a2b3c", fast_options()).await.unwrap_err();

        match err {
            Error::BlueprintBuildFailed { id, status, reason } => {
                assert_eq!(id, "bpt-1a2b3c");
                assert_eq!(status, BlueprintStatus::Failed);
                assert_eq!(reason.as_deref(), Some("dockerfile step 4 exited 1"));
            }
            other => panic!("expected BlueprintBuildFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn already_built_blueprint_stops_on_the_initial_fetch() {
        let api = ScriptedBlueprintApi::new(vec![view(
            "bpt-1a2b3c",
            BlueprintStatus::BuildComplete,
            None,
        )]);
        let built = await_built(&api, "bpt-1a2b3c", fast_options()).await.unwrap();
        assert_eq!(built.status, BlueprintStatus::BuildComplete);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stuck_build_exhausts_the_attempt_budget() {
        let api = ScriptedBlueprintApi::new(vec![view(
            "bpt-1a2b3c",
            BlueprintStatus::Building,
            None,
        )]);
        let err = await_built(&api, "bpt-1a2b3c", fast_options().with_max_attempts(3))
            .await
            .unwrap_err();

        match err {
            Error::WaitAttemptsExhausted {
                resource,
                attempts,
                last_status,
                ..
            } => {
                assert_eq!(resource, "blueprint");
                assert_eq!(attempts, 3);
                assert_eq!(last_status, "building");
            }
            other => panic!("expected WaitAttemptsExhausted, got {other:?}"),
        }
    }
}
