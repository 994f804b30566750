//! Crew runtime: role-playing agents working through tasks together
//!
//! A [`Crew`] owns a set of [`CrewAgent`]s and an ordered list of [`Task`]s.
//! Under [`Process::Sequential`] each task runs on its assigned agent; under
//! [`Process::Hierarchical`] a manager agent runs every task and delegates to
//! the crew through the coworker tools. Every agent turn is an
//! [`AgentExecutor`] loop against an LLM provider.

pub mod agent;
pub mod crew;
pub mod delegation;
pub mod executor;
pub mod interpolate;
pub mod task;
pub mod usage;

#[cfg(test)]
mod testing;

pub use agent::{CrewAgent, CrewAgentBuilder, WorkScope};
pub use crew::{Crew, CrewBuilder, CrewOutput, MANAGER_ROLE, ManagerLlm, Process};
pub use delegation::{AskQuestionTool, DelegateWorkTool};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use interpolate::Inputs;
pub use task::{Task, TaskOutput};
pub use usage::UsageMeter;
