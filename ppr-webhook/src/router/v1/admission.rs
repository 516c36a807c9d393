// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use axum::{
    extract::Extension,
    response::IntoResponse,
    routing::post,
    Router,
    Json,
};
use std::sync::Arc;
use kube::core::{admission::{AdmissionRequest, AdmissionResponse, AdmissionReview}, DynamicObject};

use ppr_common::state::State;
use ppr_hooks::hook::HookSet;

use crate::admission::pod::review_pod;

pub fn router() -> Router {
    Router::new().route("/pods/mutate", post(mutate_pod_endpoint))
}

async fn mutate_pod_endpoint(
    Extension(state): Extension<Arc<State>>,
    Extension(hooks): Extension<Arc<HookSet>>,
    payload: Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let request: AdmissionRequest<DynamicObject> = match payload.0.try_into() {
        Ok(request) => request,
        Err(err) => {
            return Json(AdmissionResponse::invalid(err.to_string()).into_review());
        }
    };

    let response = review_pod(&hooks, &request, state.config.hooks.request_timeout()).await;

    Json(response.into_review())
}
