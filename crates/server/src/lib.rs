//! HTTP front-end for the Math Tutor Agent.
//!
//! A thin axum server exposing the agent over REST: one `POST /ask`
//! endpoint per question, plus a health check.

mod routes;
mod server;
mod state;

pub use server::TutorServer;
pub use state::AppState;
