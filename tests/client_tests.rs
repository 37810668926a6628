//! Client flows against an in-process stub of the REST API
//!
//! The stub keeps everything in memory and mirrors the server's ownership
//! and delete rules closely enough to observe what the client does.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Form, Json, Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use locehpad::{
    client::{
        pages::{CartPage, FilterPage, InventoryPage, LocationsPage, RequestsPage},
        table, ApiClient, AuthState, ClientError, MemoryTokenStore, Session, TokenStore,
    },
    models::{
        cart::{Cart, CartItem, SubmitCartResponse},
        enums::{RequestStatus, RequestType},
        localisation::{CreateLocalisation, Localisation},
        materiel::{CreateMateriel, Materiel, MaterielFilter},
        request::{RequestDraft, ServiceRequest, UpdateRequestStatus},
        user::{LoginForm, TokenResponse, User, UserClaims},
    },
};

const SECRET: &str = "stub-secret";

#[derive(Default)]
struct Stub {
    next_id: i32,
    tokens: Vec<(String, User)>,
    seen_authorization: Vec<String>,
    seen_queries: Vec<Option<String>>,
    materiels: Vec<Materiel>,
    localisations: Vec<Localisation>,
    cart_items: Vec<CartItem>,
    requests: Vec<ServiceRequest>,
    request_list_fetches: usize,
}

type Shared = Arc<Mutex<Stub>>;

impl Stub {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn authorize(&mut self, headers: &HeaderMap) -> Result<User, StatusCode> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_string();
        self.seen_authorization.push(value.clone());
        let token = value.strip_prefix("Bearer ").ok_or(StatusCode::UNAUTHORIZED)?;
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, u)| u.clone())
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

fn account(username: &str) -> Option<User> {
    match username {
        "cadre" => Some(User {
            id: 1,
            username: "cadre".to_string(),
            is_admin: true,
        }),
        "soignant" => Some(User {
            id: 2,
            username: "soignant".to_string(),
            is_admin: false,
        }),
        _ => None,
    }
}

async fn login(State(stub): State<Shared>, Form(form): Form<LoginForm>) -> Result<Json<TokenResponse>, StatusCode> {
    let user = account(&form.username)
        .filter(|_| form.password == "secret")
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let token = UserClaims::for_user(&user, 30)
        .create_token(SECRET)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    stub.lock().unwrap().tokens.push((token.clone(), user));
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

async fn list_materiels(
    State(stub): State<Shared>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
    Query(filter): Query<MaterielFilter>,
) -> Result<Json<Vec<Materiel>>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    stub.authorize(&headers)?;
    stub.seen_queries.push(raw);

    let in_range = |value: Option<chrono::DateTime<Utc>>, start: Option<NaiveDate>, end: Option<NaiveDate>| {
        if start.is_none() && end.is_none() {
            return true;
        }
        let Some(day) = value.map(|v| v.date_naive()) else {
            return false;
        };
        start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
    };

    let rows = stub
        .materiels
        .iter()
        .filter(|m| {
            filter.search_query.as_deref().map_or(true, |q| {
                m.reference_interne
                    .as_deref()
                    .is_some_and(|r| r.to_lowercase().contains(&q.to_lowercase()))
            })
        })
        .filter(|m| filter.material_type_id.map_or(true, |t| m.material_type_id == Some(t)))
        .filter(|m| in_range(m.date_livraison, filter.start_date, filter.end_date))
        .filter(|m| in_range(m.date_reprise, filter.start_date_reprise, filter.end_date_reprise))
        .cloned()
        .collect();
    Ok(Json(rows))
}

async fn create_materiel(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Json(data): Json<CreateMateriel>,
) -> Result<(StatusCode, Json<Materiel>), StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    let localisation = data
        .localisation_id
        .and_then(|id| stub.localisations.iter().find(|l| l.id == id).cloned());
    let materiel = Materiel {
        id: stub.id(),
        owner_id: Some(user.id),
        material_type_id: data.material_type_id,
        material_type: None,
        reference_interne: data.reference_interne,
        localisation_id: localisation.as_ref().map(|l| l.id),
        localisation,
        date_livraison: data.date_livraison,
        date_reprise: data.date_reprise,
    };
    stub.materiels.push(materiel.clone());
    Ok((StatusCode::CREATED, Json(materiel)))
}

async fn list_localisations(State(stub): State<Shared>, headers: HeaderMap) -> Result<Json<Vec<Localisation>>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    stub.authorize(&headers)?;
    Ok(Json(stub.localisations.clone()))
}

async fn create_localisation(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Json(data): Json<CreateLocalisation>,
) -> Result<(StatusCode, Json<Localisation>), StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    let localisation = Localisation {
        id: stub.id(),
        nom_etablissement: data.nom_etablissement,
        secteur: data.secteur,
        numero_chambre: data.numero_chambre,
        nom_complet_resident: data.nom_complet_resident,
        owner_id: Some(user.id),
    };
    stub.localisations.push(localisation.clone());
    Ok((StatusCode::CREATED, Json(localisation)))
}

async fn delete_localisation(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let mut stub = stub.lock().unwrap();
    stub.authorize(&headers)?;
    stub.localisations.retain(|l| l.id != id);
    for m in stub.materiels.iter_mut().filter(|m| m.localisation_id == Some(id)) {
        m.localisation_id = None;
        m.localisation = None;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_cart(State(stub): State<Shared>, headers: HeaderMap) -> Result<Json<Cart>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    Ok(Json(Cart {
        id: user.id,
        user_id: user.id,
        items: stub.cart_items.iter().filter(|i| i.cart_id == user.id).cloned().collect(),
    }))
}

async fn add_cart_item(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Json(draft): Json<RequestDraft>,
) -> Result<(StatusCode, Json<CartItem>), StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    let materiel = stub
        .materiels
        .iter()
        .find(|m| m.id == draft.materiel_id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    let item = CartItem {
        id: stub.id(),
        cart_id: user.id,
        materiel_id: materiel.id,
        request_type: draft.request_type,
        description: draft.description,
        materiel,
    };
    stub.cart_items.push(item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn remove_cart_item(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    let before = stub.cart_items.len();
    stub.cart_items.retain(|i| !(i.id == id && i.cart_id == user.id));
    if stub.cart_items.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_cart(State(stub): State<Shared>, headers: HeaderMap) -> Result<Json<SubmitCartResponse>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    let (mine, rest): (Vec<CartItem>, Vec<CartItem>) = stub.cart_items.drain(..).partition(|i| i.cart_id == user.id);
    stub.cart_items = rest;
    if mine.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let batch_id = Uuid::new_v4();
    let now = Utc::now();
    for item in &mine {
        let id = stub.id();
        stub.requests.push(ServiceRequest {
            id,
            batch_id,
            materiel_id: Some(item.materiel_id),
            user_id: Some(user.id),
            request_type: item.request_type,
            status: RequestStatus::default(),
            description: item.description.clone(),
            created_at: now,
            updated_at: now,
            materiel: Some(item.materiel.clone()),
            user: Some(user.clone()),
        });
    }
    Ok(Json(SubmitCartResponse {
        message: "Demandes soumises avec succès !".to_string(),
        batch_id,
        requests_created: mine.len(),
    }))
}

async fn list_requests(State(stub): State<Shared>, headers: HeaderMap) -> Result<Json<Vec<ServiceRequest>>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    stub.authorize(&headers)?;
    stub.request_list_fetches += 1;
    Ok(Json(stub.requests.iter().rev().cloned().collect()))
}

async fn update_request(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(data): Json<UpdateRequestStatus>,
) -> Result<Json<ServiceRequest>, StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    if !user.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }
    let request = stub
        .requests
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    request.status = data.status;
    request.updated_at = Utc::now();
    Ok(Json(request.clone()))
}

async fn delete_request(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, StatusCode> {
    let mut stub = stub.lock().unwrap();
    let user = stub.authorize(&headers)?;
    if !user.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }
    stub.requests.retain(|r| r.id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn start_stub() -> (SocketAddr, Shared) {
    let stub: Shared = Arc::new(Mutex::new(Stub::default()));
    let app = Router::new()
        .route("/token", post(login))
        .route("/materiels/", get(list_materiels).post(create_materiel))
        .route("/localisations/", get(list_localisations).post(create_localisation))
        .route("/localisations/:id", delete(delete_localisation))
        .route("/cart/", get(get_cart))
        .route("/cart/items", post(add_cart_item))
        .route("/cart/items/:id", delete(remove_cart_item))
        .route("/cart/submit", post(submit_cart))
        .route("/requests/", get(list_requests))
        .route("/requests/:id", put(update_request).delete(delete_request))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, stub)
}

async fn logged_in(addr: SocketAddr, username: &str) -> ApiClient {
    let session = Arc::new(Session::new(MemoryTokenStore::new()));
    let client = ApiClient::new(&format!("http://{}", addr), session).unwrap();
    client.login(username, "secret").await.unwrap();
    client
}

fn day(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
}

#[tokio::test]
async fn test_login_stores_token_and_sends_it() {
    let (addr, stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;

    let token = client.session().token().expect("token stored");
    assert_eq!(
        client.session().state(),
        AuthState::LoggedIn {
            username: "cadre".to_string(),
            is_admin: true
        }
    );

    InventoryPage::open(&client).await.unwrap();
    let seen = stub.lock().unwrap().seen_authorization.clone();
    assert_eq!(seen, vec![format!("Bearer {}", token)]);
}

#[tokio::test]
async fn test_bad_credentials_leave_session_unchanged() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "soignant").await;
    let before = client.session().token();

    let result = client.login("soignant", "wrong").await;
    assert!(matches!(result, Err(ClientError::InvalidCredentials)));
    assert_eq!(client.session().token(), before);
    assert!(client.session().is_logged_in());
}

#[tokio::test]
async fn test_non_admin_claims_hide_admin_actions() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "soignant").await;

    let caps = client.session().capabilities();
    assert!(!caps.manage_users);
    assert!(!caps.direct_request);
    assert!(!caps.choose_owner);
    assert!(!caps.change_request_status);
}

#[tokio::test]
async fn test_equipment_without_associations_renders_na() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;

    let mut page = InventoryPage::open(&client).await.unwrap();
    let created = page
        .create(&CreateMateriel {
            reference_interne: Some("LIT-001".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(created.material_type.is_none());
    assert!(created.localisation.is_none());

    assert_eq!(page.rows.len(), 1);
    let table = page.table();
    let row = &table.rows()[0];
    assert_eq!(row[1], table::NOT_AVAILABLE);
    assert_eq!(row[3], table::NOT_AVAILABLE);
}

#[tokio::test]
async fn test_cart_items_for_same_equipment_submit_as_one_batch() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "soignant").await;

    let mut inventory = InventoryPage::open(&client).await.unwrap();
    let materiel = inventory
        .create(&CreateMateriel {
            reference_interne: Some("FAU-7".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut cart = CartPage::open(&client).await.unwrap();
    cart.add(materiel.id, RequestType::Livraison, None).await.unwrap();
    cart.add(materiel.id, RequestType::Depannage, Some("roue bloquée".to_string()))
        .await
        .unwrap();
    assert_eq!(cart.items().len(), 2);
    assert_ne!(cart.items()[0].request_type, cart.items()[1].request_type);

    let response = cart.submit().await.unwrap();
    assert_eq!(response.requests_created, 2);
    assert!(cart.items().is_empty());
    assert_eq!(cart.table().to_string().trim(), table::EMPTY_CART);

    let requests = RequestsPage::open(&client).await.unwrap();
    assert_eq!(requests.rows.len(), 2);
    assert!(requests.rows.iter().all(|r| r.batch_id == response.batch_id));
    assert!(requests.rows.iter().all(|r| r.status == RequestStatus::EnAttente));
}

#[tokio::test]
async fn test_request_mutations_refetch_the_list() {
    let (addr, stub) = start_stub().await;
    let soignant = logged_in(addr, "soignant").await;
    let mut inventory = InventoryPage::open(&soignant).await.unwrap();
    let materiel = inventory.create(&CreateMateriel::default()).await.unwrap();
    let mut cart = CartPage::open(&soignant).await.unwrap();
    cart.add(materiel.id, RequestType::Livraison, None).await.unwrap();
    cart.add(materiel.id, RequestType::Reprise, None).await.unwrap();
    cart.submit().await.unwrap();

    let cadre = logged_in(addr, "cadre").await;
    let mut requests = RequestsPage::open(&cadre).await.unwrap();
    assert_eq!(requests.rows.len(), 2);
    let first = requests.rows[0].id;
    let second = requests.rows[1].id;

    // Someone else deletes a request behind the page's back
    stub.lock().unwrap().requests.retain(|r| r.id != second);
    let fetches = stub.lock().unwrap().request_list_fetches;

    requests.set_status(first, RequestStatus::Terminee).await.unwrap();
    assert_eq!(stub.lock().unwrap().request_list_fetches, fetches + 1);
    assert_eq!(requests.rows.len(), 1);
    assert_eq!(requests.rows[0].status, RequestStatus::Terminee);

    assert!(requests.delete(first, |_| true).await.unwrap());
    assert_eq!(stub.lock().unwrap().request_list_fetches, fetches + 2);
    assert!(requests.rows.is_empty());
}

#[tokio::test]
async fn test_declined_request_delete_sends_nothing() {
    let (addr, stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;
    let mut requests = RequestsPage::open(&client).await.unwrap();
    let fetches = stub.lock().unwrap().request_list_fetches;

    assert!(!requests.delete(42, |_| false).await.unwrap());
    assert_eq!(stub.lock().unwrap().request_list_fetches, fetches);
}

#[tokio::test]
async fn test_failed_submit_keeps_local_items() {
    let (addr, stub) = start_stub().await;
    let client = logged_in(addr, "soignant").await;

    let mut inventory = InventoryPage::open(&client).await.unwrap();
    let materiel = inventory.create(&CreateMateriel::default()).await.unwrap();
    let mut cart = CartPage::open(&client).await.unwrap();
    cart.add(materiel.id, RequestType::Reprise, None).await.unwrap();

    // Items vanish server-side, so the submit is refused as empty
    stub.lock().unwrap().cart_items.clear();
    assert!(matches!(cart.submit().await, Err(ClientError::Api { status, .. }) if status == StatusCode::BAD_REQUEST));
    assert_eq!(cart.items().len(), 1);
}

#[tokio::test]
async fn test_deleting_location_refreshes_equipment() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;

    let mut locations = LocationsPage::open(&client, None).await.unwrap();
    let location = locations
        .create(&CreateLocalisation {
            nom_etablissement: "Les Tilleuls".to_string(),
            secteur: "A".to_string(),
            numero_chambre: "3".to_string(),
            nom_complet_resident: "Marcel Dupont".to_string(),
            owner_id: None,
        })
        .await
        .unwrap();

    let mut inventory = InventoryPage::open(&client).await.unwrap();
    inventory
        .create(&CreateMateriel {
            localisation_id: Some(location.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(inventory.rows[0].localisation.is_some());

    locations.delete(location.id).await.unwrap();
    assert!(locations.registry.rows.is_empty());
    assert_eq!(locations.inventory.rows.len(), 1);
    assert!(locations.inventory.rows[0].localisation.is_none());
    assert_eq!(locations.inventory.table().rows()[0][3], table::NOT_AVAILABLE);
}

#[tokio::test]
async fn test_empty_filter_result_shows_message() {
    let (addr, _stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;

    let mut inventory = InventoryPage::open(&client).await.unwrap();
    inventory
        .create(&CreateMateriel {
            date_livraison: Some(day(2024, 3, 10)),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut page = FilterPage::new(&client);
    let rows = page
        .apply(MaterielFilter {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(page.table().to_string().trim(), table::NO_FILTER_RESULTS);

    let rows = page
        .apply(MaterielFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_absent_filter_fields_are_omitted_from_query() {
    let (addr, stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;

    let mut page = FilterPage::new(&client);
    page.apply(MaterielFilter {
        search_query: Some("lit".to_string()),
        material_type_id: Some(4),
        ..Default::default()
    })
    .await
    .unwrap();
    page.apply(MaterielFilter {
        search_query: Some("   ".to_string()),
        ..Default::default()
    })
    .await
    .unwrap();

    let queries = stub.lock().unwrap().seen_queries.clone();
    assert_eq!(queries[0].as_deref(), Some("search_query=lit&material_type_id=4"));
    assert_eq!(queries[1], None);
}

#[tokio::test]
async fn test_unauthorized_response_logs_out() {
    let (addr, stub) = start_stub().await;
    let store = Arc::new(MemoryTokenStore::new());
    let session = Arc::new(Session::new(SharedStore(store.clone())));
    let client = ApiClient::new(&format!("http://{}", addr), session.clone()).unwrap();
    client.login("cadre", "secret").await.unwrap();
    assert!(store.load().unwrap().is_some());

    let mut state = session.subscribe();
    state.borrow_and_update();

    // Server forgets every token, as if it expired
    stub.lock().unwrap().tokens.clear();

    let result = InventoryPage::open(&client).await;
    assert!(matches!(result, Err(ClientError::Unauthorized)));
    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), AuthState::LoggedOut);
    assert!(session.token().is_none());
    assert!(store.load().unwrap().is_none());

    // Protected views now bail out before reaching the server
    let calls = stub.lock().unwrap().seen_authorization.len();
    assert!(matches!(RequestsPage::open(&client).await, Err(ClientError::Unauthorized)));
    assert_eq!(stub.lock().unwrap().seen_authorization.len(), calls);
}

#[tokio::test]
async fn test_concurrent_unauthorized_calls_log_out_once() {
    let (addr, stub) = start_stub().await;
    let client = logged_in(addr, "cadre").await;
    stub.lock().unwrap().tokens.clear();

    let mut state = client.session().subscribe();
    state.borrow_and_update();

    let calls: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { InventoryPage::open(&client).await.map(|_| ()) })
        })
        .collect();
    for call in calls {
        assert!(matches!(call.await.unwrap(), Err(ClientError::Unauthorized)));
    }

    assert_eq!(*state.borrow_and_update(), AuthState::LoggedOut);
    assert!(!state.has_changed().unwrap());
}

/// Lets the test inspect the store the session writes to
struct SharedStore(Arc<MemoryTokenStore>);

impl TokenStore for SharedStore {
    fn load(&self) -> locehpad::client::ClientResult<Option<String>> {
        self.0.load()
    }

    fn save(&self, token: &str) -> locehpad::client::ClientResult<()> {
        self.0.save(token)
    }

    fn clear(&self) -> locehpad::client::ClientResult<()> {
        self.0.clear()
    }
}
