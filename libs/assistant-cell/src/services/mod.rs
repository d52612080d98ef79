pub mod time_expression;
pub mod session;
pub mod completion;
pub mod classifier;
pub mod booking;
pub mod tools;
pub mod dispatcher;

pub use time_expression::{parse_time_expression, matches_time_expression, TimeExpression};
pub use session::{ConversationSession, SessionStore};
pub use completion::{CompletionClient, OpenAiClient};
pub use classifier::SpecializationClassifier;
pub use booking::{BookingOutcome, BookingRequest, SlotBookingService};
pub use tools::{Tool, ToolOutput, ToolSet};
pub use dispatcher::AgentDispatcher;
