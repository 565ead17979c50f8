pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod format;
pub mod navigation;
pub mod request;
pub mod session;
pub mod state;
pub mod types;
pub mod validate;
pub mod view;

pub use config::{ClientConfig, get_config_path};
pub use dispatch::{HttpTransport, RawResponse, SubmissionDispatcher, Transport};
pub use error::{
    AnalysisError, ConfigError, DispatchError, Result, ValidationError, ViralscopeError,
};
pub use extract::{clean_summary, extract_document_info, extract_key_points};
pub use format::{format_count, format_duration, format_file_size, format_result_readable};
pub use navigation::{NavigationState, ResultSection};
pub use request::{AnalysisRequest, DocumentRequest, InputDraft, YoutubeRequest, build_request};
pub use session::{NavigationCommand, Session, SessionHandle, SessionSnapshot};
pub use state::{AnalysisState, AnalysisStateMachine, Resolution, SubmissionTicket, SubmitRejected};
pub use types::{AnalysisResult, DocumentAnalysis, Score, SubmissionKind, VideoAnalysis};
pub use validate::{
    DocumentFile, mime_for_path, parse_duration_string, validate_file, validate_youtube_input,
};
pub use view::{EngagementLevel, ViralTier, shape_response};
