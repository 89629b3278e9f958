use std::sync::Arc;

use log::{error, warn, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum request body size to accept. Event and booking
/// submissions are small JSON documents.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if e.is_client_error() {
            warn!(logger, "Rejected request"; "context" => ?r.context, "status" => %status, "message" => %e);
        } else {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?e, "status" => %status, "message" => %e);
        }

        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        Validation(..) | NonExistentEvent { .. } | InvalidId(..) | MalformedSubmission(..) => {
            StatusCode::BAD_REQUEST
        }
        SlugAlreadyExists { .. } => StatusCode::CONFLICT,
        NonExistentId(..) | NonExistentSlug(..) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Every API route, with backend errors rendered as JSON.
pub fn make_api_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_list_route(environment.clone())
        .or(make_create_route(environment.clone()))
        .or(make_similar_route(environment.clone()))
        .or(make_booking_count_route(environment.clone()))
        .or(make_retrieve_route(environment.clone()))
        .or(make_update_route(environment.clone()))
        .or(make_delete_route(environment.clone()))
        .or(make_booking_route(environment.clone()))
        .or(make_delete_booking_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

mod internal {
    use warp::body::{bytes, content_length_limit};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, path as p, path::param as par, post, put};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let a = environment.urls.api_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(a));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list_events, rt; p("events"), end(), g());
    route!(make_create_route => create_event, rt; p("events"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), bytes());
    route!(make_similar_route => similar_events, rt; p!("events" / String / "similar"), end(), g());
    route!(make_booking_count_route => booking_count, rt; p!("events" / String / "bookings" / "count"), end(), g());
    route!(make_retrieve_route => retrieve_event, rt; p("events"), par::<String>(), end(), g());
    route!(make_update_route => update_event, rt; p("events"), par::<String>(), end(), put(), content_length_limit(MAX_CONTENT_LENGTH), bytes());
    route!(make_delete_route => delete_event, rt; p("events"), par::<String>(), end(), delete());
    route!(make_booking_route => create_booking, rt; p("bookings"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), bytes());
    route!(make_delete_booking_route => delete_booking, rt; p("bookings"), par::<String>(), end(), delete());
}
