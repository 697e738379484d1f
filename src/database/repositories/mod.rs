pub mod push_token;
pub mod swap_request;
pub mod workspace;

// Re-export all repositories for easy importing
pub use push_token::PushTokenRepository;
pub use swap_request::SwapRequestRepository;
pub use workspace::WorkspaceRepository;
