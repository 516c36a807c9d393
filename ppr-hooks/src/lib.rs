// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

#[allow(unused_extern_crates)]
extern crate self as ppr_hooks;

pub mod error;
pub mod hook;
pub mod translate;
