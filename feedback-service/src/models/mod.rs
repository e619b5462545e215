//! Request and response models for the feedback service.

pub mod feedback;

pub use feedback::{
    EMPTY_TEXT_MESSAGE, FeedbackRequest, FeedbackResponse, Sentiment, WelcomeResponse,
};
