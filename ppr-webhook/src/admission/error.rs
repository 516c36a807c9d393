// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::time::Duration;
use thiserror::Error;
use std::result::Result;

use ppr_hooks::error::HookError;

#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error(transparent)]
    HookError(#[from] HookError),
    #[error("mutation did not finish within {0:?}")]
    Timeout(Duration),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type AdmissionResult<T> = Result<T, AdmissionError>;
