#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod cards;
pub mod capture;
pub mod location;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::capabilities::{CameraError, PositionResult, ShotResult};
use crate::cards::{
    CardId, CardRepository, CardStatus, FilterTab, EXPIRY_REMINDER_MONTHS,
};
use crate::capture::{CapturePhase, CaptureResult, CaptureSession};
use crate::location::{Coordinates, StoreLocation, LOCATE_FAILED_MESSAGE, SUMMARY_UNAVAILABLE_MESSAGE};

pub use app::App;
pub use capabilities::{Capabilities, Effect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Location,
    LocationPermissionDenied,
    Camera,
    CameraPermissionDenied,
    NotFound,
    DataLoad,
    InvalidState,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Location => "LOCATION_ERROR",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::Camera => "CAMERA_ERROR",
            Self::CameraPermissionDenied => "CAMERA_PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::DataLoad => "DATA_LOAD_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Location | Self::Camera => ErrorSeverity::Transient,
            Self::LocationPermissionDenied
            | Self::CameraPermissionDenied
            | Self::NotFound
            | Self::DataLoad
            | Self::InvalidState
            | Self::Unknown => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Location | Self::Camera)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Position failures all collapse to one category; the user never needs
    /// to distinguish a denied permission from a dead GPS.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Location | ErrorKind::LocationPermissionDenied => {
                LOCATE_FAILED_MESSAGE.into()
            }
            ErrorKind::Camera => "Camera error. Please try the shot again.".into(),
            ErrorKind::CameraPermissionDenied => {
                "Camera access is required. Please enable camera permissions in Settings.".into()
            }
            ErrorKind::NotFound => "The requested item could not be found.".into(),
            ErrorKind::DataLoad => "Could not load your gift cards.".into(),
            ErrorKind::InvalidState => {
                "The app is in an invalid state. Please restart the app.".into()
            }
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Error => 5000,
        }
    }
}

/// The single active top-level view. The active filter tab lives outside so
/// Detail and Capturing round trips restore it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Listing,
    Detail {
        card_id: CardId,
    },
    Capturing,
}

impl Screen {
    #[must_use]
    pub const fn is_listing(&self) -> bool {
        matches!(self, Self::Listing)
    }

    #[must_use]
    pub const fn is_detail(&self) -> bool {
        matches!(self, Self::Detail { .. })
    }

    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }
}

/// Location popup overlay. Exists only while Detail is active for the same
/// card; `seq` stamps the in-flight position fetch so late results for a
/// closed or superseded popup are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPopup {
    pub card_id: CardId,
    pub status: PopupStatus,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupStatus {
    /// Store has no physical presence; only the online link applies.
    OnlineOnly,
    Loading,
    Ready(Vec<StoreLocation>),
    Failed(String),
}

impl PopupStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Which consumer an in-flight position fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationQuery {
    PopupStores,
    DetailSummary,
}

#[must_use]
pub fn current_date() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub struct Model {
    pub repo: CardRepository,
    pub screen: Screen,
    pub active_tab: FilterTab,
    pub popup: Option<LocationPopup>,
    pub nearest_summary: Option<String>,
    pub summary_loading: bool,
    pub summary_seq: u64,
    pub capture: Option<CaptureSession>,
    pub shot_in_flight: bool,
    pub last_capture: Option<CaptureResult>,
    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
    pub location_seq: u64,
    pub today: NaiveDate,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            repo: CardRepository::default(),
            screen: Screen::Listing,
            active_tab: FilterTab::All,
            popup: None,
            nearest_summary: None,
            summary_loading: false,
            summary_seq: 0,
            capture: None,
            shot_in_flight: false,
            last_capture: None,
            active_error: None,
            active_toast: None,
            location_seq: 0,
            today: current_date(),
        }
    }
}

impl Model {
    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    /// Monotonic stamp shared by every position fetch.
    pub fn next_location_seq(&mut self) -> u64 {
        self.location_seq += 1;
        self.location_seq
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Noop,

    AppStarted,

    FilterSelected {
        tab: FilterTab,
    },
    CardSelected {
        card_id: String,
    },
    DetailClosed,

    LocationPopupOpened {
        card_id: String,
    },
    LocationPopupClosed,
    NearestStoreSummaryRequested,
    PositionFetched {
        query: LocationQuery,
        seq: u64,
        result: Box<PositionResult>,
    },

    CaptureOpened,
    CaptureClosed,
    ShotRequested,
    ShotCompleted(Box<ShotResult>),

    DismissError,
    DismissToast,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::FilterSelected { .. } => "filter_selected",
            Self::CardSelected { .. } => "card_selected",
            Self::DetailClosed => "detail_closed",
            Self::LocationPopupOpened { .. } => "location_popup_opened",
            Self::LocationPopupClosed => "location_popup_closed",
            Self::NearestStoreSummaryRequested => "nearest_store_summary_requested",
            Self::PositionFetched { .. } => "position_fetched",
            Self::CaptureOpened => "capture_opened",
            Self::CaptureClosed => "capture_closed",
            Self::ShotRequested => "shot_requested",
            Self::ShotCompleted(_) => "shot_completed",
            Self::DismissError => "dismiss_error",
            Self::DismissToast => "dismiss_toast",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::FilterSelected { .. }
                | Self::CardSelected { .. }
                | Self::DetailClosed
                | Self::LocationPopupOpened { .. }
                | Self::LocationPopupClosed
                | Self::NearestStoreSummaryRequested
                | Self::CaptureOpened
                | Self::CaptureClosed
                | Self::ShotRequested
                | Self::DismissError
                | Self::DismissToast
        )
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: String,
    pub store: String,
    pub value: f64,
    pub currency: String,
    pub status: CardStatus,
    pub expiration_date: String,
    pub months_until_expiration: u32,
    pub tradable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    pub id: String,
    pub store: String,
    pub value: f64,
    pub currency: String,
    pub status: CardStatus,
    pub expiration_date: String,
    pub months_until_expiration: u32,
    pub location_tag: String,
    pub online_link: Option<String>,
    pub has_physical_presence: bool,
    pub tradable: bool,
    pub nearest_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopupView {
    OnlineOnly {
        store: String,
        link: Option<String>,
    },
    Loading {
        store: String,
    },
    Stores {
        store: String,
        locations: Vec<StoreLocation>,
        online_link: Option<String>,
    },
    Failed {
        store: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Listing {
        active_tab: FilterTab,
        cards: Vec<CardSummary>,
        expiring_soon: usize,
    },
    Detail {
        card: CardDetail,
        popup: Option<PopupView>,
    },
    Capturing {
        phase: CapturePhase,
        front_taken: bool,
        instruction: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.kind.default_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub state: ViewState,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
    pub last_capture: Option<CaptureResult>,
}

pub mod app {
    use super::*;
    use crate::capabilities::Capabilities;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn handle_popup_opened(model: &mut Model, caps: &Capabilities, card_id: &str) {
            let Screen::Detail { card_id: active } = &model.screen else {
                tracing::debug!("popup open outside detail ignored");
                return;
            };
            if active.as_str() != card_id {
                tracing::debug!(requested = card_id, "popup open for non-active card ignored");
                return;
            }
            if model.popup.is_some() {
                // Re-entrant open while loading (or already shown) coalesces.
                return;
            }
            let active = active.clone();
            let Some(card) = model.repo.get(&active) else {
                return;
            };

            if !location::has_physical_presence(&card.store) {
                model.popup = Some(LocationPopup {
                    card_id: active,
                    status: PopupStatus::OnlineOnly,
                    seq: 0,
                });
                caps.render.render();
                return;
            }

            let seq = model.next_location_seq();
            model.popup = Some(LocationPopup {
                card_id: active,
                status: PopupStatus::Loading,
                seq,
            });
            caps.geolocation.get_position(move |result| Event::PositionFetched {
                query: LocationQuery::PopupStores,
                seq,
                result: Box::new(result),
            });
            caps.render.render();
        }

        fn apply_popup_position(
            model: &mut Model,
            caps: &Capabilities,
            seq: u64,
            result: PositionResult,
        ) {
            let store = {
                let Some(popup) = &model.popup else {
                    tracing::debug!("position result with no popup open; discarded");
                    return;
                };
                if popup.seq != seq || !popup.status.is_loading() {
                    tracing::debug!(seq, "stale popup position result discarded");
                    return;
                }
                model.repo.get(&popup.card_id).map(|c| c.store.clone())
            };

            let Some(popup) = model.popup.as_mut() else {
                return;
            };
            popup.status = match (store, result) {
                (Some(store), Ok(position)) => {
                    let origin = Coordinates::from(&position);
                    PopupStatus::Ready(location::nearby_stores(&store, origin))
                }
                (_, Err(e)) => {
                    tracing::warn!(error = %e, "position fetch failed for popup");
                    PopupStatus::Failed(LOCATE_FAILED_MESSAGE.to_string())
                }
                (None, Ok(_)) => PopupStatus::Failed(LOCATE_FAILED_MESSAGE.to_string()),
            };
            caps.render.render();
        }

        fn apply_summary_position(
            model: &mut Model,
            caps: &Capabilities,
            seq: u64,
            result: PositionResult,
        ) {
            if !model.summary_loading || model.summary_seq != seq {
                tracing::debug!(seq, "stale summary position result discarded");
                return;
            }
            model.summary_loading = false;

            let Screen::Detail { card_id } = &model.screen else {
                return;
            };
            let Some(card) = model.repo.get(card_id) else {
                return;
            };

            model.nearest_summary = Some(match result {
                Ok(position) => {
                    location::nearest_store_summary(&card.store, Coordinates::from(&position))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "position fetch failed for summary");
                    SUMMARY_UNAVAILABLE_MESSAGE.to_string()
                }
            });
            caps.render.render();
        }

        fn handle_shot_completed(model: &mut Model, caps: &Capabilities, result: ShotResult) {
            match result {
                Ok(image) => {
                    let Some(session) = model.capture.as_mut() else {
                        return;
                    };
                    match session.record_shot(image) {
                        Ok(Some(capture_result)) => {
                            model.last_capture = Some(capture_result);
                            model.capture = None;
                            model.screen = Screen::Listing;
                            model.show_toast("Card images captured", ToastKind::Success);
                        }
                        Ok(None) => {
                            // Front stored; the shell now frames the back.
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "shot arrived for a finished session");
                        }
                    }
                }
                Err(CameraError::Cancelled) => {
                    tracing::debug!("shot cancelled; same side can be retried");
                }
                Err(e) => {
                    let kind = if matches!(e, CameraError::PermissionDenied) {
                        ErrorKind::CameraPermissionDenied
                    } else {
                        ErrorKind::Camera
                    };
                    tracing::warn!(error = %e, "shot failed");
                    model.set_error(AppError::new(kind, e.to_string()));
                }
            }
            caps.render.render();
        }

        fn listing_view(model: &Model) -> ViewState {
            let cards = model
                .repo
                .filtered(model.active_tab)
                .into_iter()
                .map(|c| CardSummary {
                    id: c.id.as_str().to_string(),
                    store: c.store.clone(),
                    value: c.value,
                    currency: c.currency.clone(),
                    status: c.status,
                    expiration_date: c.expiration_date.to_string(),
                    months_until_expiration: c.months_until_expiration(model.today),
                    tradable: c.tradable,
                })
                .collect();

            ViewState::Listing {
                active_tab: model.active_tab,
                cards,
                expiring_soon: model
                    .repo
                    .expiring_soon(EXPIRY_REMINDER_MONTHS, model.today),
            }
        }

        /// A tag is a tappable link only when it is a bare URL. Tags mixing a
        /// URL with free text (store hints, coordinates) are display-only;
        /// the WHATWG parser would happily percent-encode the spaces away.
        fn online_link(tag: &str) -> Option<String> {
            if tag.contains(char::is_whitespace) {
                return None;
            }
            url::Url::parse(tag).ok().map(|u| u.to_string())
        }

        fn detail_view(model: &Model, card: &cards::GiftCard) -> ViewState {
            let online_link = Self::online_link(&card.location_tag);

            let popup = model.popup.as_ref().map(|p| match &p.status {
                PopupStatus::OnlineOnly => PopupView::OnlineOnly {
                    store: card.store.clone(),
                    link: online_link.clone(),
                },
                PopupStatus::Loading => PopupView::Loading {
                    store: card.store.clone(),
                },
                PopupStatus::Ready(locations) => PopupView::Stores {
                    store: card.store.clone(),
                    locations: locations.clone(),
                    online_link: online_link.clone(),
                },
                PopupStatus::Failed(message) => PopupView::Failed {
                    store: card.store.clone(),
                    message: message.clone(),
                },
            });

            ViewState::Detail {
                card: CardDetail {
                    id: card.id.as_str().to_string(),
                    store: card.store.clone(),
                    value: card.value,
                    currency: card.currency.clone(),
                    status: card.status,
                    expiration_date: card.expiration_date.to_string(),
                    months_until_expiration: card.months_until_expiration(model.today),
                    location_tag: card.location_tag.clone(),
                    online_link,
                    has_physical_presence: location::has_physical_presence(&card.store),
                    tradable: card.tradable,
                    nearest_summary: model.nearest_summary.clone(),
                },
                popup,
            }
        }

        fn capture_view(model: &Model) -> ViewState {
            let session = model.capture.as_ref();
            ViewState::Capturing {
                phase: session.map_or(CapturePhase::Front, CaptureSession::phase),
                front_taken: session.is_some_and(CaptureSession::front_taken),
                instruction: session
                    .and_then(CaptureSession::next_side)
                    .map(|side| side.instruction().to_string()),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            tracing::debug!(
                event = event.name(),
                user = event.is_user_initiated(),
                "handling event"
            );

            match event {
                Event::Noop => {}

                Event::AppStarted => {
                    model.today = current_date();
                    match CardRepository::load_seed() {
                        Ok(repo) => model.repo = repo,
                        Err(e) => {
                            tracing::error!(error = %e, "seed card data failed to parse");
                            model.set_error(
                                AppError::new(ErrorKind::DataLoad, "Card data unavailable")
                                    .with_internal(e.to_string()),
                            );
                        }
                    }
                    caps.render.render();
                }

                Event::FilterSelected { tab } => {
                    if !model.screen.is_listing() {
                        tracing::debug!(tab = tab.as_str(), "filter change outside listing ignored");
                        return;
                    }
                    model.active_tab = tab;
                    caps.render.render();
                }

                Event::CardSelected { card_id } => {
                    if !model.screen.is_listing() {
                        return;
                    }
                    let id = CardId::new(card_id);
                    if model.repo.get(&id).is_none() {
                        tracing::warn!(card_id = %id, "selected card not found");
                        return;
                    }
                    model.screen = Screen::Detail { card_id: id };
                    model.popup = None;
                    model.nearest_summary = None;
                    model.summary_loading = false;
                    caps.render.render();
                }

                Event::DetailClosed => {
                    if !model.screen.is_detail() {
                        return;
                    }
                    // The remembered tab is untouched, so the listing comes
                    // back exactly as it was left.
                    model.screen = Screen::Listing;
                    model.popup = None;
                    model.nearest_summary = None;
                    model.summary_loading = false;
                    caps.render.render();
                }

                Event::LocationPopupOpened { card_id } => {
                    Self::handle_popup_opened(model, caps, &card_id);
                }

                Event::LocationPopupClosed => {
                    if model.popup.take().is_some() {
                        caps.render.render();
                    }
                }

                Event::NearestStoreSummaryRequested => {
                    if !model.screen.is_detail() {
                        return;
                    }
                    if model.summary_loading {
                        return;
                    }
                    let seq = model.next_location_seq();
                    model.summary_seq = seq;
                    model.summary_loading = true;
                    caps.geolocation.get_position(move |result| Event::PositionFetched {
                        query: LocationQuery::DetailSummary,
                        seq,
                        result: Box::new(result),
                    });
                    caps.render.render();
                }

                Event::PositionFetched { query, seq, result } => match query {
                    LocationQuery::PopupStores => {
                        Self::apply_popup_position(model, caps, seq, *result);
                    }
                    LocationQuery::DetailSummary => {
                        Self::apply_summary_position(model, caps, seq, *result);
                    }
                },

                Event::CaptureOpened => {
                    if !model.screen.is_listing() {
                        return;
                    }
                    model.capture = Some(CaptureSession::new());
                    model.shot_in_flight = false;
                    model.screen = Screen::Capturing;
                    caps.render.render();
                }

                Event::CaptureClosed => {
                    if !model.screen.is_capturing() {
                        return;
                    }
                    model.capture = None;
                    model.shot_in_flight = false;
                    model.screen = Screen::Listing;
                    caps.render.render();
                }

                Event::ShotRequested => {
                    if !model.screen.is_capturing() || model.shot_in_flight {
                        return;
                    }
                    let Some(side) = model.capture.as_ref().and_then(CaptureSession::next_side)
                    else {
                        return;
                    };
                    model.shot_in_flight = true;
                    caps.camera
                        .take_shot(side, |result| Event::ShotCompleted(Box::new(result)));
                }

                Event::ShotCompleted(result) => {
                    model.shot_in_flight = false;
                    if !model.screen.is_capturing() {
                        tracing::debug!("shot result after capture closed; discarded");
                        return;
                    }
                    Self::handle_shot_completed(model, caps, *result);
                }

                Event::DismissError => {
                    model.clear_error();
                    caps.render.render();
                }

                Event::DismissToast => {
                    model.clear_toast();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let state = match &model.screen {
                Screen::Listing => Self::listing_view(model),
                Screen::Detail { card_id } => model
                    .repo
                    .get(card_id)
                    .map_or_else(|| Self::listing_view(model), |card| Self::detail_view(model, card)),
                Screen::Capturing => Self::capture_view(model),
            };

            ViewModel {
                state,
                error: model.active_error.as_ref().map(UserFacingError::from),
                toast: model.active_toast.as_ref().map(ToastView::from),
                last_capture: model.last_capture.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_all_position_errors_collapse_to_one_message() {
            let denied = AppError::new(ErrorKind::LocationPermissionDenied, "permission denied");
            let unavailable = AppError::new(ErrorKind::Location, "no fix");
            assert_eq!(denied.user_facing_message(), "Could not locate nearest store");
            assert_eq!(
                unavailable.user_facing_message(),
                "Could not locate nearest store"
            );
        }

        #[test]
        fn test_retryability_follows_kind() {
            assert!(AppError::new(ErrorKind::Camera, "x").is_retryable());
            assert!(AppError::new(ErrorKind::Location, "x").is_retryable());
            assert!(!AppError::new(ErrorKind::CameraPermissionDenied, "x").is_retryable());
            assert!(!AppError::new(ErrorKind::DataLoad, "x").is_retryable());
        }

        #[test]
        fn test_display_includes_code_and_internal() {
            let e = AppError::new(ErrorKind::DataLoad, "seed broken").with_internal("EOF at line 3");
            assert_eq!(
                e.to_string(),
                "[DATA_LOAD_ERROR] seed broken (internal: EOF at line 3)"
            );
        }
    }

    mod model_tests {
        use super::*;

        #[test]
        fn test_initial_state_is_listing_all() {
            let model = Model::default();
            assert_eq!(model.screen, Screen::Listing);
            assert_eq!(model.active_tab, FilterTab::All);
            assert!(model.popup.is_none());
            assert!(model.capture.is_none());
        }

        #[test]
        fn test_location_seq_is_monotonic() {
            let mut model = Model::default();
            let a = model.next_location_seq();
            let b = model.next_location_seq();
            assert!(b > a);
        }
    }

    mod view_tests {
        use super::*;
        use crate::cards::GiftCard;
        use crate::capture::CardSide;
        use chrono::NaiveDate;
        use crux_core::App as _;

        fn seeded_model() -> Model {
            Model {
                repo: CardRepository::load_seed().unwrap(),
                today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                ..Model::default()
            }
        }

        #[test]
        fn test_listing_view_respects_active_tab() {
            let mut model = seeded_model();
            model.active_tab = FilterTab::Used;
            let view = App.view(&model);

            let ViewState::Listing {
                active_tab, cards, ..
            } = view.state
            else {
                panic!("expected listing");
            };
            assert_eq!(active_tab, FilterTab::Used);
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].store, "Zalando");
        }

        #[test]
        fn test_listing_view_months_until_expiration() {
            let model = seeded_model();
            let view = App.view(&model);
            let ViewState::Listing { cards, .. } = view.state else {
                panic!("expected listing");
            };
            // Amazon expires 2025-01-01, reference 2024-06-01.
            assert_eq!(cards[0].months_until_expiration, 7);
        }

        #[test]
        fn test_detail_view_classifies_location_tag() {
            let mut model = seeded_model();
            model.screen = Screen::Detail {
                card_id: CardId::new("1"),
            };
            let view = App.view(&model);
            let ViewState::Detail { card, popup } = view.state else {
                panic!("expected detail");
            };
            assert_eq!(card.online_link.as_deref(), Some("https://www.amazon.de/"));
            assert!(!card.has_physical_presence);
            assert!(popup.is_none());

            // Target's tag is descriptive text, not a parseable URL.
            model.screen = Screen::Detail {
                card_id: CardId::new("3"),
            };
            let view = App.view(&model);
            let ViewState::Detail { card, .. } = view.state else {
                panic!("expected detail");
            };
            assert!(card.online_link.is_none());
            assert!(card.has_physical_presence);
        }

        #[test]
        fn test_detail_view_falls_back_to_listing_for_missing_card() {
            let mut model = seeded_model();
            model.screen = Screen::Detail {
                card_id: CardId::new("does-not-exist"),
            };
            let view = App.view(&model);
            assert!(matches!(view.state, ViewState::Listing { .. }));
        }

        #[test]
        fn test_capture_view_reflects_session_phase() {
            let mut model = seeded_model();
            model.screen = Screen::Capturing;
            model.capture = Some(CaptureSession::new());

            let view = App.view(&model);
            let ViewState::Capturing {
                phase,
                front_taken,
                instruction,
            } = view.state
            else {
                panic!("expected capturing");
            };
            assert_eq!(phase, CapturePhase::Front);
            assert!(!front_taken);
            assert_eq!(
                instruction.as_deref(),
                Some(CardSide::Front.instruction())
            );
        }

        #[test]
        fn test_expiring_soon_counts_unused_cards() {
            let model = Model {
                today: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                repo: CardRepository::from_cards(vec![GiftCard {
                    id: CardId::new("1"),
                    store: "Target".into(),
                    value: 10.0,
                    currency: "€".into(),
                    expiration_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                    status: CardStatus::Unused,
                    location_tag: "https://www.target.com/".into(),
                    tradable: true,
                }]),
                ..Model::default()
            };

            let view = App.view(&model);
            let ViewState::Listing { expiring_soon, .. } = view.state else {
                panic!("expected listing");
            };
            assert_eq!(expiring_soon, 1);
        }
    }
}
