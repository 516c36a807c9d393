// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use std::sync::Arc;

use crate::hook::traits::{GuestPods, HostResources};
use crate::translate::NameTranslator;

// Context struct to hold the host and guest clients shared by every hook
#[derive(Clone)]
pub struct Context {
    pub host: Arc<dyn HostResources>,
    pub guest: Arc<dyn GuestPods>,
    pub translator: Arc<dyn NameTranslator>,
    /// Host namespace probed for operator provided objects
    pub target_namespace: String,
}

impl Context {
    pub fn new(
        host: Arc<dyn HostResources>,
        guest: Arc<dyn GuestPods>,
        translator: Arc<dyn NameTranslator>,
        target_namespace: impl Into<String>,
    ) -> Self {
        Self {
            host,
            guest,
            translator,
            target_namespace: target_namespace.into(),
        }
    }
}
