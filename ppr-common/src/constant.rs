// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

pub const APP_NAME: &str = "prefer-parent-resources";
pub const ENV_PREFIX: &str = "PPR";

/// Annotation the synchronizer writes on host objects naming the guest object
pub const OBJECT_NAME_ANNOTATION: &str = "vcluster.loft.sh/object-name";
/// Annotation the synchronizer writes on host objects naming the guest namespace
pub const OBJECT_NAMESPACE_ANNOTATION: &str = "vcluster.loft.sh/object-namespace";
/// Comma joined list of the hooks that processed an object
pub const MUTATED_BY_HOOK_ANNOTATION: &str = "vcluster.loft.sh/mutated-by-hook";
