pub mod models;
pub mod resolve;
pub mod validation;
pub mod reference;
pub mod orchestrator;
pub mod pipeline;
pub mod view;

pub use models::{CreateBookingRequest, PassengerInput};
pub use orchestrator::{PaymentOrchestrator, SimulatedPaymentAdapter};
pub use pipeline::{BookingPipeline, PipelineConfig};
pub use view::BookingView;
