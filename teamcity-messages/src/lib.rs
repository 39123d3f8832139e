// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Build and serialize [TeamCity service
//! messages](https://www.jetbrains.com/help/teamcity/service-messages.html) in Rust.
//!
//! A service message is a single line of the form
//! `##teamcity[<name> <key>='<value>' ...]`. Free-text values are escaped with
//! [`escape`] as they are added to a [`ServiceMessage`]; numeric values and
//! values that were escaped ahead of time are stored verbatim.

mod message;
mod serialize;
mod timestamp;

pub use message::*;
pub use serialize::escape;
pub use timestamp::*;
