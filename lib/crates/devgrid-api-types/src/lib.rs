//! Wire types for the Devgrid API.
//!
//! Pure data definitions shared by the SDK and any service speaking the
//! Devgrid REST surface. No I/O lives here.

pub mod blueprint;
pub mod devbox;
pub mod execution;
pub mod scenario;
pub mod snapshot;

pub use blueprint::{BlueprintListView, BlueprintStatus, BlueprintView, CreateBlueprintRequest};
pub use devbox::{
    AwaitStatusChangeRequest, CreateDevboxRequest, DevboxListView, DevboxStatus, DevboxView,
    FileContentsView, ReadFileRequest, WriteFileRequest,
};
pub use execution::{ExecRequest, ExecutionStatus, ExecutionView};
pub use scenario::{ScenarioRunListView, ScenarioRunStatus, ScenarioRunView, ScoreRunRequest};
pub use snapshot::{DiskSnapshotListView, DiskSnapshotStatus, DiskSnapshotView};
