//! Single binary web server: read-only views from STATIC_DIR, tournament state via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT, DATA_DIR, ROSTER_PATH,
//! STATIC_DIR, REFEREE_PASSWORD, THIRD_PLACE_MATCH_ID, BEST_PLACED_SLOTS, LOCK_TIMEOUT_SECS.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use football_tournament_web::logic::{group_stage_complete, standings_by_group, TO_BE_DETERMINED};
use football_tournament_web::{
    calculate_standings, default_roster, default_seed, find_match_by_id, load_roster_csv,
    referee_update, tournament_leaders, Config, KnockoutRound, MatchId, MatchLocation,
    MatchStatus, MatchStore, MatchUpdate, QualifiedTeam, RefereeAction, Resolver, StoreError,
    Team, TimeSlot, TournamentError,
};
use serde::{Deserialize, Serialize};

/// Session key set once the referee password has been given.
const REFEREE_SESSION_KEY: &str = "referee";

/// Entries per leaderboard.
const LEADERBOARD_SIZE: usize = 5;

struct AppState {
    config: Config,
    roster: Vec<Vec<Team>>,
    store: MatchStore,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StandingsResponse {
    /// While false every position is provisional.
    group_stage_complete: bool,
    groups: Vec<Vec<QualifiedTeam>>,
}

/// A knockout match as the bracket view shows it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BracketEntry {
    round: KnockoutRound,
    index: usize,
    id: Option<MatchId>,
    time: TimeSlot,
    field: u32,
    teams: String,
    status: MatchStatus,
    score1: Option<u32>,
    score2: Option<u32>,
    /// Set when the bracket data feeding this match is corrupt (cycle, runaway chain).
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

#[derive(Deserialize)]
struct KnockoutPath {
    round: String,
    index: usize,
}

fn error_body(e: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": e.to_string() })
}

fn store_error(e: StoreError) -> HttpResponse {
    match &e {
        StoreError::Tournament(
            TournamentError::MatchNotFound(_) | TournamentError::MatchIndexOutOfRange { .. },
        ) => HttpResponse::NotFound().json(error_body(e)),
        StoreError::Tournament(_) => HttpResponse::BadRequest().json(error_body(e)),
        StoreError::LockTimeout(_) => HttpResponse::ServiceUnavailable().json(error_body(e)),
        _ => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(error_body(e))
        }
    }
}

fn is_referee(session: &Session) -> bool {
    session
        .get::<bool>(REFEREE_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(error_body("Referee login required"))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "football-tournament-web",
    })
}

/// Group matches as stored.
#[get("/api/matches")]
async fn api_matches(state: State) -> HttpResponse {
    match state.store.group_matches().await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => store_error(e),
    }
}

/// Knockout bracket as stored, without resolution.
#[get("/api/knockout")]
async fn api_knockout(state: State) -> HttpResponse {
    match state.store.knockout().await {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => store_error(e),
    }
}

#[get("/api/standings")]
async fn api_standings(state: State) -> HttpResponse {
    let matches = match state.store.group_matches().await {
        Ok(m) => m,
        Err(e) => return store_error(e),
    };
    let qualified = calculate_standings(&state.roster, &matches);
    HttpResponse::Ok().json(StandingsResponse {
        group_stage_complete: group_stage_complete(&matches),
        groups: standings_by_group(&qualified),
    })
}

/// Every knockout match with its contestants resolved against the current results. A match whose
/// feeds are corrupt keeps its entry, with the fallback text and an `error`.
#[get("/api/bracket")]
async fn api_bracket(state: State) -> HttpResponse {
    let snapshot = match state.store.snapshot().await {
        Ok(s) => s,
        Err(e) => return store_error(e),
    };
    let qualified = calculate_standings(&state.roster, &snapshot.group);
    let slots = state.config.slot_map_builder().build(&qualified);
    let resolver =
        Resolver::new(&slots, &snapshot).with_third_place_id(state.config.third_place_id.clone());

    let mut entries = Vec::new();
    for round in KnockoutRound::ALL {
        for (index, m) in snapshot.knockout.round(round).iter().enumerate() {
            let (teams, error) = match resolver.display(m) {
                Ok(t) => (t, None),
                Err(e) => {
                    log::error!("Bracket resolution failed at {} {}: {}", round, index, e);
                    let fallback = m.description.as_deref().unwrap_or(TO_BE_DETERMINED);
                    (fallback.to_string(), Some(e.to_string()))
                }
            };
            entries.push(BracketEntry {
                round,
                index,
                id: m.id.clone(),
                time: m.time,
                field: m.field,
                teams,
                status: m.status(),
                score1: m.score1,
                score2: m.score2,
                error,
            });
        }
    }
    HttpResponse::Ok().json(entries)
}

#[get("/api/statistics")]
async fn api_statistics(state: State) -> HttpResponse {
    match state.store.group_matches().await {
        Ok(matches) => {
            let qualified = calculate_standings(&state.roster, &matches);
            HttpResponse::Ok().json(tournament_leaders(&qualified, LEADERBOARD_SIZE))
        }
        Err(e) => store_error(e),
    }
}

#[post("/api/referee/login")]
async fn api_referee_login(state: State, session: Session, body: Json<LoginBody>) -> HttpResponse {
    if body.password != state.config.referee_password {
        log::warn!("Rejected referee login");
        return HttpResponse::Unauthorized().json(error_body("Wrong password"));
    }
    session.renew();
    match session.insert(REFEREE_SESSION_KEY, true) {
        Ok(()) => {
            log::info!("Referee logged in");
            HttpResponse::Ok().json(serde_json::json!({ "referee": true }))
        }
        Err(e) => HttpResponse::InternalServerError().json(error_body(e)),
    }
}

#[post("/api/referee/logout")]
async fn api_referee_logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "referee": false }))
}

#[get("/api/referee/status")]
async fn api_referee_status(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "referee": is_referee(&session) }))
}

/// Partial update of the match with this id, group or knockout.
#[put("/api/matches/{id}")]
async fn api_update_match(
    state: State,
    session: Session,
    path: Path<String>,
    body: Json<MatchUpdate>,
) -> HttpResponse {
    if !is_referee(&session) {
        return unauthorized();
    }
    let id = MatchId::from(path.into_inner());
    match state.store.update_match(&id, &body).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => store_error(e),
    }
}

/// Referee button press (goal, undo, start, finish, reset) on the match with this id.
#[post("/api/matches/{id}/action")]
async fn api_match_action(
    state: State,
    session: Session,
    path: Path<String>,
    body: Json<RefereeAction>,
) -> HttpResponse {
    if !is_referee(&session) {
        return unauthorized();
    }
    let id = MatchId::from(path.into_inner());
    let snapshot = match state.store.snapshot().await {
        Ok(s) => s,
        Err(e) => return store_error(e),
    };
    let update = match find_match_by_id(&id, &snapshot) {
        Some(m) => referee_update(m, body.into_inner()),
        None => return store_error(TournamentError::MatchNotFound(id).into()),
    };
    match state.store.update_match(&id, &update).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => store_error(e),
    }
}

/// Update a knockout match by position, for matches stored without an id.
#[put("/api/knockout/{round}/{index}")]
async fn api_update_knockout(
    state: State,
    session: Session,
    path: Path<KnockoutPath>,
    body: Json<MatchUpdate>,
) -> HttpResponse {
    if !is_referee(&session) {
        return unauthorized();
    }
    let round: KnockoutRound = match path.round.parse() {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(error_body(e)),
    };
    let location = MatchLocation::Knockout(round, path.index);
    match state.store.update_at(location, &body).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => store_error(e),
    }
}

/// Update a group match by position.
#[put("/api/group/{index}")]
async fn api_update_group(
    state: State,
    session: Session,
    path: Path<usize>,
    body: Json<MatchUpdate>,
) -> HttpResponse {
    if !is_referee(&session) {
        return unauthorized();
    }
    match state
        .store
        .update_at(MatchLocation::Group(path.into_inner()), &body)
        .await
    {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => store_error(e),
    }
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_matches)
        .service(api_knockout)
        .service(api_standings)
        .service(api_bracket)
        .service(api_statistics)
        .service(api_referee_login)
        .service(api_referee_logout)
        .service(api_referee_status)
        .service(api_update_match)
        .service(api_match_action)
        .service(api_update_knockout)
        .service(api_update_group);
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let roster = match &config.roster_path {
        Some(path) => load_roster_csv(path),
        None => default_roster(),
    }
    .map_err(startup_error)?;

    let store = MatchStore::open(&config.data_dir, config.lock_timeout);
    let seed = default_seed().map_err(startup_error)?;
    if store.initialize(&seed).await.map_err(startup_error)? {
        log::info!("Initialized match data in {}", config.data_dir.display());
    }

    let bind = (config.host.clone(), config.port);
    let static_dir = config.static_dir.clone();
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        config,
        roster,
        store,
    });
    // Sessions do not survive a restart; the referee logs in again.
    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .configure(api_routes)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}
