//! Park rental booking flow.
//!
//! The steps run login → ticket → categories → vehicles → payment → safety →
//! thankyou. All state between steps travels in the URL path; the database
//! only ever receives inserts.

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::{cookie::Key, SignedCookieJar};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    db::Database,
    error::AppError,
    flash,
    models::{LoginForm, NewBooking, PaymentForm, VehicleForm},
    views,
};

#[derive(Clone)]
pub struct RentalState {
    pub db: Database,
    pub key: Key,
}

impl RentalState {
    pub fn new(config: &Config) -> Self {
        Self {
            db: Database::new(&config.database_path),
            key: config.signing_key(),
        }
    }
}

impl FromRef<RentalState> for Key {
    fn from_ref(state: &RentalState) -> Self {
        state.key.clone()
    }
}

pub fn router(state: RentalState) -> Router {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/ticket/:user_id", get(ticket_page).post(buy_ticket))
        .route("/categories/:user_id", get(categories))
        .route("/vehicles/:user_id/:category", get(vehicles_page).post(choose_vehicle))
        .route(
            "/payment/:user_id/:vehicle/:duration/:cost",
            get(payment_page).post(pay),
        )
        .route("/safety", get(safety))
        .route("/thankyou", get(thankyou))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Path for the payment step. Free-text segments are percent-encoded.
pub fn payment_path(user_id: i64, vehicle: &str, duration: &str, cost: i64) -> String {
    format!(
        "/payment/{user_id}/{}/{}/{cost}",
        urlencoding::encode(vehicle),
        urlencoding::encode(duration)
    )
}

fn vehicles_path(user_id: i64, category: &str) -> String {
    format!("/vehicles/{user_id}/{}", urlencoding::encode(category))
}

pub async fn login_page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, views::login(flash.as_ref()))
}

pub async fn login(
    State(state): State<RentalState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match form.validate() {
        Ok(user) => user,
        Err(err) => return err.recover(jar, "/"),
    };

    match state.db.call(move |db| db.insert_user(&user)).await {
        Ok(user_id) => {
            info!(user_id, "User registered");
            Redirect::to(&format!("/ticket/{user_id}")).into_response()
        }
        Err(err) => err.recover(jar, "/"),
    }
}

pub async fn ticket_page(
    State(state): State<RentalState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
) -> Response {
    let (jar, flash) = flash::take(jar);
    match state.db.call(move |db| db.find_user(user_id)).await {
        Ok(user) => (jar, views::ticket(flash.as_ref(), user.as_ref())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn buy_ticket(
    State(state): State<RentalState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let back = format!("/ticket/{user_id}");
    let mode = match form.validate() {
        Ok(mode) => mode,
        Err(err) => return err.recover(jar, &back),
    };

    match state.db.call(move |db| db.insert_ticket(user_id, &mode)).await {
        Ok(ticket_id) => {
            info!(user_id, ticket_id, "Ticket paid");
            Redirect::to(&format!("/categories/{user_id}")).into_response()
        }
        Err(err) => err.recover(jar, &back),
    }
}

pub async fn categories(
    State(state): State<RentalState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tickets = state
        .db
        .call(move |db| db.tickets_for_user(user_id))
        .await?;
    Ok(views::categories(user_id, &tickets))
}

pub async fn vehicles_page(
    jar: SignedCookieJar,
    Path((_user_id, category)): Path<(i64, String)>,
) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, views::vehicles(flash.as_ref(), &category))
}

pub async fn choose_vehicle(
    jar: SignedCookieJar,
    Path((user_id, category)): Path<(i64, String)>,
    Form(form): Form<VehicleForm>,
) -> Response {
    match form.validate() {
        Ok(choice) => {
            info!(user_id, category = %category, vehicle = %choice.vehicle, "Vehicle chosen");
            Redirect::to(&payment_path(
                user_id,
                &choice.vehicle,
                &choice.duration,
                choice.cost,
            ))
            .into_response()
        }
        Err(err) => err.recover(jar, &vehicles_path(user_id, &category)),
    }
}

pub async fn payment_page(
    jar: SignedCookieJar,
    Path((_user_id, vehicle, duration, cost)): Path<(i64, String, String, i64)>,
) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, views::payment(flash.as_ref(), &vehicle, &duration, cost))
}

pub async fn pay(
    State(state): State<RentalState>,
    jar: SignedCookieJar,
    Path((user_id, vehicle, duration, cost)): Path<(i64, String, String, i64)>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let back = payment_path(user_id, &vehicle, &duration, cost);
    let booking = match form.validate() {
        Ok(payment_mode) => NewBooking {
            user_id,
            vehicle_name: vehicle,
            duration,
            cost,
            payment_mode,
        },
        Err(err) => return err.recover(jar, &back),
    };

    match state.db.call(move |db| db.insert_booking(&booking)).await {
        Ok(booking_id) => {
            info!(user_id, booking_id, cost, "Booking paid");
            Redirect::to("/safety").into_response()
        }
        Err(err) => err.recover(jar, &back),
    }
}

pub async fn safety() -> impl IntoResponse {
    views::safety()
}

pub async fn thankyou() -> impl IntoResponse {
    views::thankyou()
}
