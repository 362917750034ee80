use crux_core::testing::AppTester;
use giftsnap_shared::capabilities::{CameraError, ImageRef};
use giftsnap_shared::capture::CapturePhase;
use giftsnap_shared::{App, Effect, ErrorKind, Event, Model, Screen, ToastKind};

fn capturing_app() -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::AppStarted, &mut model);
    app.update(Event::CaptureOpened, &mut model);
    (app, model)
}

#[test]
fn test_two_shot_capture_completes_and_returns_to_listing() {
    let (app, mut model) = capturing_app();
    assert_eq!(model.screen, Screen::Capturing);

    let update = app.update(Event::ShotRequested, &mut model);
    assert!(model.shot_in_flight);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Camera(_))));

    app.update(
        Event::ShotCompleted(Box::new(Ok(ImageRef::new("img-front")))),
        &mut model,
    );
    let session = model.capture.as_ref().unwrap();
    assert_eq!(session.phase(), CapturePhase::Back);
    assert!(session.front_taken());
    assert!(!model.shot_in_flight);

    app.update(Event::ShotRequested, &mut model);
    app.update(
        Event::ShotCompleted(Box::new(Ok(ImageRef::new("img-back")))),
        &mut model,
    );

    assert_eq!(model.screen, Screen::Listing);
    assert!(model.capture.is_none());

    let capture = model.last_capture.as_ref().unwrap();
    assert_eq!(capture.front.as_str(), "img-front");
    assert_eq!(capture.back.as_str(), "img-back");

    let toast = model.active_toast.as_ref().unwrap();
    assert_eq!(toast.message, "Card images captured");
    assert_eq!(toast.kind, ToastKind::Success);
}

#[test]
fn test_shot_requests_coalesce_while_one_is_in_flight() {
    let (app, mut model) = capturing_app();

    app.update(Event::ShotRequested, &mut model);
    let update = app.update(Event::ShotRequested, &mut model);
    assert!(!update.effects.iter().any(|e| matches!(e, Effect::Camera(_))));
}

#[test]
fn test_cancelled_shot_keeps_the_same_side() {
    let (app, mut model) = capturing_app();

    app.update(Event::ShotRequested, &mut model);
    app.update(
        Event::ShotCompleted(Box::new(Err(CameraError::Cancelled))),
        &mut model,
    );

    let session = model.capture.as_ref().unwrap();
    assert_eq!(session.phase(), CapturePhase::Front);
    assert!(!model.shot_in_flight);
    assert!(model.active_error.is_none());

    // The same side can be retried straight away.
    let update = app.update(Event::ShotRequested, &mut model);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Camera(_))));
}

#[test]
fn test_permission_denied_raises_error_but_keeps_session() {
    let (app, mut model) = capturing_app();

    app.update(Event::ShotRequested, &mut model);
    app.update(
        Event::ShotCompleted(Box::new(Err(CameraError::PermissionDenied))),
        &mut model,
    );

    let error = model.active_error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::CameraPermissionDenied);
    assert!(model.capture.is_some());
    assert_eq!(model.screen, Screen::Capturing);
}

#[test]
fn test_late_shot_after_capture_closed_is_discarded() {
    let (app, mut model) = capturing_app();

    app.update(Event::ShotRequested, &mut model);
    app.update(Event::CaptureClosed, &mut model);
    assert_eq!(model.screen, Screen::Listing);

    app.update(
        Event::ShotCompleted(Box::new(Ok(ImageRef::new("img-late")))),
        &mut model,
    );
    assert!(model.last_capture.is_none());
    assert!(model.capture.is_none());
    assert_eq!(model.screen, Screen::Listing);
}

#[test]
fn test_capture_cannot_open_outside_listing() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::AppStarted, &mut model);
    app.update(
        Event::CardSelected {
            card_id: "1".to_string(),
        },
        &mut model,
    );

    app.update(Event::CaptureOpened, &mut model);
    assert!(model.screen.is_detail());
    assert!(model.capture.is_none());
}

#[test]
fn test_reopening_capture_starts_a_fresh_session() {
    let (app, mut model) = capturing_app();

    app.update(Event::ShotRequested, &mut model);
    app.update(
        Event::ShotCompleted(Box::new(Ok(ImageRef::new("img-front")))),
        &mut model,
    );
    app.update(Event::CaptureClosed, &mut model);

    app.update(Event::CaptureOpened, &mut model);
    let session = model.capture.as_ref().unwrap();
    assert_eq!(session.phase(), CapturePhase::Front);
    assert!(!session.front_taken());
}
