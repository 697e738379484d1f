pub mod actor_context;
pub mod auth;
pub mod ids;
pub mod notifications;
pub mod presets;
pub mod roles;
pub mod schedule;
pub mod shift_types;
pub mod stats;
pub mod swaps;
pub mod time_utils;
pub mod workspace;

pub use actor_context::ActorContext;
pub use auth::{Claims, Identity};
pub use notifications::{
    ExpoPushDispatcher, LogDispatcher, NotificationDispatcher, Notifier, PushNotification,
};
pub use presets::PresetService;
pub use schedule::ScheduleService;
pub use swaps::SwapService;
pub use workspace::WorkspaceService;
