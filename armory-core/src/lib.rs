//! Armory Core
//!
//! Core types shared by the Armory build worker and the platform client.
//!
//! This crate contains:
//! - Domain types: Platform records the build worker reads (Payload, AgentType, etc.)
//!   and the build configuration it hands to external build tooling
//! - DTOs: Inbound build requests and outbound result events

pub mod domain;
pub mod dto;
