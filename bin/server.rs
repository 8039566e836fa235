// CMV Dashboard - Web Server
// JSON API over one loaded spreadsheet; the presentation layer lives here,
// the pipeline stays in the library

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use cmv_dashboard::{
    export_detalhado, export_resumo_os, Aggregate, CostRecord, Dashboard, FilterCriteria,
    RiskTier, TierCounts, Totals,
};

/// Shared application state.
///
/// The dataset is read once at startup and never mutated, so a plain `Arc`
/// is enough - every request recomputes its derived view from the same
/// records.
#[derive(Clone)]
struct AppState {
    records: Arc<Vec<CostRecord>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Filter dimensions as they arrive on the query string, comma-separated.
#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    status: Option<String>,
    os: Option<String>,
    familia: Option<String>,
    busca: Option<String>,
}

impl FilterQuery {
    fn into_criteria(self) -> FilterCriteria {
        let split = |value: Option<String>| -> Vec<String> {
            value
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        FilterCriteria {
            status: split(self.status)
                .iter()
                .filter_map(|label| RiskTier::from_label(label))
                .collect(),
            os: split(self.os),
            familias: split(self.familia),
            busca_os: self.busca.unwrap_or_default(),
        }
    }
}

/// Summary block: headline metrics plus the option lists the filter widgets
/// need.
#[derive(Serialize)]
struct ResumoResponse {
    totais: Totals,
    contadores: TierCounts,
    os_options: Vec<String>,
    familia_options: Vec<String>,
    n_registros: usize,
    vazio: bool,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/registros - Filtered detail rows
async fn get_registros(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());
    Json(ApiResponse::ok(dashboard.registros))
}

/// GET /api/os - Per-OS aggregates (status filter applies here)
async fn get_por_os(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());
    Json(ApiResponse::ok(dashboard.por_os))
}

/// GET /api/familias - Per-família aggregates
async fn get_por_familia(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());
    Json(ApiResponse::ok(dashboard.por_familia))
}

/// Drill-down query: one família name.
#[derive(Deserialize)]
struct FamiliaDrill {
    familia: String,
}

/// GET /api/familias/os - OSs drawing from one família (whole dataset)
async fn get_os_of_familia(
    State(state): State<AppState>,
    Query(query): Query<FamiliaDrill>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &FilterCriteria::default());
    let aggregates: Vec<Aggregate> = dashboard.os_of_familia(&query.familia);
    Json(ApiResponse::ok(aggregates))
}

/// GET /api/resumo - Totals, tier counts, and filter option lists
async fn get_resumo(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());

    Json(ApiResponse::ok(ResumoResponse {
        vazio: dashboard.is_empty(),
        n_registros: dashboard.registros.len(),
        totais: dashboard.totais,
        contadores: dashboard.contadores,
        os_options: dashboard.os_options,
        familia_options: dashboard.familia_options,
    }))
}

fn csv_download(filename: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
}

/// GET /api/export/detalhado - Filtered detail CSV (UTF-8 BOM)
async fn download_detalhado(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());

    match export_detalhado(&dashboard.registros) {
        Ok(bytes) => csv_download("cmv_detalhado.csv", bytes).into_response(),
        Err(e) => {
            eprintln!("Error exporting detail CSV: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /api/export/os - Per-OS summary CSV (UTF-8 BOM)
async fn download_por_os(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let dashboard = Dashboard::build(&state.records, &query.into_criteria());

    match export_resumo_os(&dashboard.por_os) {
        Ok(bytes) => csv_download("cmv_por_os.csv", bytes).into_response(),
        Err(e) => {
            eprintln!("Error exporting OS summary CSV: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Análise de CMV - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = match std::env::args().nth(1) {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            eprintln!("❌ Uso: cmv-server <planilha>");
            std::process::exit(1);
        }
    };

    let grid = match cmv_dashboard::load_grid(&path) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let records = match cmv_dashboard::processar_planilha(&grid) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Corrija a planilha e reinicie o servidor.");
            std::process::exit(1);
        }
    };

    println!("✓ {} registros carregados de {:?}", records.len(), path);

    let state = AppState {
        records: Arc::new(records),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/registros", get(get_registros))
        .route("/os", get(get_por_os))
        .route("/familias", get(get_por_familia))
        .route("/familias/os", get(get_os_of_familia))
        .route("/resumo", get(get_resumo))
        .route("/export/detalhado", get(download_detalhado))
        .route("/export/os", get(download_por_os))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/resumo");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
