use axum::{Json, Router, routing::get};

use crate::{
    dto::skill::{SKILLS, SkillInfo},
    state::SharedState,
};

/// Skill catalog endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/skills", get(list_skills))
}

#[utoipa::path(
    get,
    path = "/skills",
    tag = "skills",
    responses((status = 200, description = "Skills a participant can register with", body = [SkillInfo]))
)]
/// List the skills accepted by participant registration.
pub async fn list_skills() -> Json<&'static [SkillInfo]> {
    Json(SKILLS.as_slice())
}
