//! # viewer-core
//!
//! Core library for project-viewer: a persistent, reorderable tree of
//! projects inside an editor, and switching the editor window between them.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Every call runs to
//!   completion for one input event.
//! - **Not thread-safe**: Hosts provide their own synchronization.
//! - **Graceful degradation**: Unknown nodes, self-drops, missing saved
//!   states and failed writes degrade to no-ops or fallbacks, never panics.
//! - **Host-agnostic**: The editor is reached only through [`WorkspaceHost`]
//!   and [`StateStorage`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use viewer_core::{FileConfig, FileStateStorage, ProjectStore, ProjectViewer, StorageConfig};
//!
//! let storage = StorageConfig::default();
//! let store = ProjectStore::load(&storage.projects_file());
//! let mut viewer = ProjectViewer::new(
//!     store,
//!     my_host,
//!     FileStateStorage::new(storage.clone()),
//!     FileConfig::new(storage.config_file()),
//! );
//! viewer.render_all();
//! ```

pub mod config;
pub mod drag;
pub mod error;
pub mod host;
pub mod reorder;
pub mod state_key;
pub mod states;
pub mod storage;
pub mod store;
pub mod switcher;
pub mod tree;
pub mod view;
pub mod viewer;

pub use config::{ConfigSource, FileConfig, SwitchConfig};
pub use drag::{DragPayload, DragSession, HoverSide, DRAG_MIME};
pub use error::{Result, ViewerError};
pub use host::{HostCall, RecordingHost, WindowRequest, WorkspaceHost};
pub use reorder::{DropOutcome, ReorderEngine};
pub use state_key::state_key;
pub use states::{FileStateStorage, MemoryStateStorage, SavedStateInfo, StateStorage};
pub use storage::StorageConfig;
pub use store::ProjectStore;
pub use switcher::{same_path_set, SwitchFlag, SwitchGuard, SwitchOutcome, WorkspaceSwitcher};
pub use tree::{NodeId, NodeLocation, ProjectNode, ProjectTree};
pub use view::{NodeView, ViewBounds, ViewMarkers, ViewRegistry};
pub use viewer::{ProjectViewer, ViewEvent, ViewEventResponse};
