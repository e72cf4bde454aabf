//! HTTP handler functions for the CompeteIntel API.

use actix_web::{HttpResponse, web};
use compete_intel_analytics_models::CallerBusinessProfile;
use compete_intel_competitor_models::OnlinePresence;
use compete_intel_demo_models::NewDemoRequest;
use compete_intel_server_models::{
    ApiHealth, CategoriesResponse, CategoryInfo, CitiesResponse, CityInfo, DemoRequestCreate,
    ErrorBody, RootInfo, SearchRequest, SearchResponse,
};
use compete_intel_source::{SearchQuery, SourceError};

use crate::AppState;

/// Stand-in profile of the caller's business for named searches.
///
/// The search request carries only a name, so positioning and
/// recommendations are computed against a typical small business.
const fn search_caller_profile() -> CallerBusinessProfile {
    CallerBusinessProfile {
        rating: 4.2,
        review_count: 87,
        online_presence: OnlinePresence {
            has_instagram: true,
            has_facebook: true,
            has_website: false,
            instagram_followers: 1500,
            facebook_likes: 800,
        },
        estimated_monthly_revenue: 45_000,
        has_delivery: true,
        accepts_pix: true,
    }
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody::new(message))
}

fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(message))
}

fn internal_error(message: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorBody::new(message))
}

/// `GET /`
pub async fn root(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(RootInfo {
        name: state.config.api_title.clone(),
        version: state.config.api_version.clone(),
        status: "online".to_string(),
        environment: state.config.environment.clone(),
        using_mock_data: state.source.is_mock(),
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "healthy".to_string(),
        version: state.config.api_version.clone(),
        environment: state.config.environment.clone(),
        using_mock_data: state.source.is_mock(),
    })
}

/// `POST /api/search`
///
/// Finds competitors and runs the analytics pipeline over them. An empty
/// result is a valid answer, not a 404.
pub async fn search(state: web::Data<AppState>, body: web::Json<SearchRequest>) -> HttpResponse {
    let request = body.into_inner();
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let query = SearchQuery {
        category: request.category.to_string(),
        city: request.city.clone(),
        coordinates: request.coordinates,
        radius_km: request.radius_km,
        max_results: request.max_results,
        neighborhood: request.neighborhood.clone(),
        cep: request.cep_filter(),
    };

    let competitors = match state.source.search(&query).await {
        Ok(competitors) => competitors,
        Err(e @ (SourceError::UnknownCity { .. } | SourceError::UnknownCategory { .. })) => {
            return bad_request(e.to_string());
        }
        Err(e) => {
            log::error!("Failed to search competitors: {e}");
            return internal_error("Failed to search competitors");
        }
    };

    let caller = request.caller_name().map(|_| search_caller_profile());
    let analytics = compete_intel_analytics::run(&competitors, request.radius_km, caller.as_ref());

    log::info!(
        "search: {} in {} -> {} competitors",
        query.category,
        query.city,
        competitors.len()
    );

    HttpResponse::Ok().json(SearchResponse {
        total_found: competitors.len(),
        search_radius_km: request.radius_km,
        query: request,
        competitors,
        analytics,
    })
}

/// `GET /api/cnpj/{cnpj}`
pub async fn cnpj(path: web::Path<String>) -> HttpResponse {
    let cnpj = path.into_inner();
    if !compete_intel_cnpj::validate(&cnpj) {
        return bad_request("Invalid CNPJ. Use the format XX.XXX.XXX/XXXX-XX or 14 digits.");
    }

    compete_intel_cnpj::lookup(&cnpj).map_or_else(
        || not_found("CNPJ not found"),
        |record| HttpResponse::Ok().json(record),
    )
}

/// `GET /api/categories`
pub async fn categories(state: web::Data<AppState>) -> HttpResponse {
    let categories = state
        .catalog
        .categories()
        .iter()
        .map(|c| CategoryInfo {
            name: c.name.clone(),
            cnae_code: c.cnae_code.clone(),
            description: c.cnae_description.clone(),
        })
        .collect();

    HttpResponse::Ok().json(CategoriesResponse { categories })
}

/// `GET /api/cities`
pub async fn cities(state: web::Data<AppState>) -> HttpResponse {
    let cities = state
        .catalog
        .cities()
        .iter()
        .map(|c| CityInfo {
            name: c.name.clone(),
            state: c.state.clone(),
            coordinates: c.center(),
        })
        .collect();

    HttpResponse::Ok().json(CitiesResponse { cities })
}

/// `POST /api/demo-request`
///
/// Processes the request synchronously; a failed analysis still answers
/// 200 with a `failed` receipt.
pub async fn create_demo_request(
    state: web::Data<AppState>,
    body: web::Json<DemoRequestCreate>,
) -> HttpResponse {
    let request = body.into_inner();
    if let Err(e) = request.validate() {
        return bad_request(e.to_string());
    }

    let input = NewDemoRequest {
        business_name: request.business_name.trim().to_string(),
        email: request.email.trim().to_string(),
        city: request.city.trim().to_string(),
        state: request.state.map(|s| s.trim().to_uppercase()),
        category: request.category,
    };

    match compete_intel_demo::process_demo_request(
        state.db.as_ref(),
        state.source.as_ref(),
        state.email.as_ref(),
        &state.config.from_email,
        &input,
    )
    .await
    {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(e) => {
            log::error!("Failed to process demo request: {e}");
            internal_error("Failed to process demo request")
        }
    }
}

/// `GET /api/demo-request/{id}`
pub async fn get_demo_request(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match compete_intel_demo::db::get_demo_request(state.db.as_ref(), &id).await {
        Ok(Some(request)) => HttpResponse::Ok().json(request),
        Ok(None) => not_found("Demo request not found"),
        Err(e) => {
            log::error!("Failed to load demo request {id}: {e}");
            internal_error("Failed to load demo request")
        }
    }
}
