use anyhow::Context;
use maplet_viewport::prelude::*;
use maplet_viewport::{constants, runtime::run_frame_loop};
use std::cell::Cell;

/// Route along the San Francisco waterfront, as (longitude, latitude)
const ROUTE: [(f64, f64); 5] = [
    (-122.4194, 37.7749),
    (-122.4101, 37.7825),
    (-122.3990, 37.7936),
    (-122.3937, 37.7955),
    (-122.3874, 37.8030),
];

/// Headless viewport walkthrough: overview of a route, then follow a simulated trip along it
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let pacing = match std::env::args().nth(1).as_deref() {
        Some("relaxed") => TransitionPacing::Relaxed,
        Some("brisk") => TransitionPacing::Brisk,
        Some(max_duration) => TransitionPacing::Custom(
            DefaultTransitionOptions::from_json(&format!("{{\"max_duration\": {max_duration}}}"))
                .with_context(|| format!("invalid pacing {max_duration:?}"))?,
        ),
        None => TransitionPacing::Standard,
    };

    let map = Rc::new(HeadlessMap::new(
        CameraState {
            center: LatLng::new(37.7749, -122.4194),
            zoom: 12.0,
            ..CameraState::default()
        },
        Point::new(1200.0, 800.0),
    ));
    let manager = ViewportManager::with_transition_options(
        map.clone(),
        ViewportOptions::default(),
        pacing.resolve(),
    );
    manager.add_status_observer(Rc::new(
        |from: &ViewportStatus, to: &ViewportStatus, reason: ViewportStatusChangeReason| {
            log::info!("viewport {} -> {} ({:?})", from, to, reason);
        },
    ));

    let route = geo_types::LineString::from(ROUTE.to_vec());
    let overview = manager.make_overview_state(
        OverviewStateOptions::new(route).with_padding(EdgeInsets::uniform(40.0)),
    );
    let follow = manager.make_follow_state(FollowStateOptions::default());
    manager.add_state(overview.handle());
    manager.add_state(follow.handle());

    let frame_interval = Duration::from_millis(constants::DEFAULT_FRAME_INTERVAL_MS);

    let to_overview = manager.transition_async(overview.handle(), None);
    run_frame_loop(frame_interval, |delta| {
        manager.update(delta);
        matches!(manager.status(), ViewportStatus::Transitioning { .. })
    })
    .await;
    anyhow::ensure!(to_overview.await, "overview transition was interrupted");
    log::info!("overview camera: {:?}", map.camera_state());

    let (lng, lat) = ROUTE[0];
    follow.update_location(LatLng::new(lat, lng), None);
    let to_follow = manager.transition_async(follow.handle(), None);

    let elapsed = Cell::new(0.0);
    let frames = run_frame_loop(frame_interval, |delta| {
        elapsed.set(elapsed.get() + delta);
        follow.update_location(position_on_route(elapsed.get() / 10.0), heading_on_route());
        manager.update(delta);
        elapsed.get() < 12.0
    })
    .await;
    anyhow::ensure!(to_follow.await, "follow transition was interrupted");

    log::info!(
        "followed the route for {} frames, camera: {:?}",
        frames,
        map.camera_state()
    );
    manager.idle();
    manager.update(0.0);
    Ok(())
}

/// Point `progress` (0 to 1) of the way along the route
fn position_on_route(progress: f64) -> LatLng {
    let scaled = progress.clamp(0.0, 1.0) * (ROUTE.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(ROUTE.len() - 2);
    let t = scaled - index as f64;
    let (lng0, lat0) = ROUTE[index];
    let (lng1, lat1) = ROUTE[index + 1];
    LatLng::new(lat0 + (lat1 - lat0) * t, lng0 + (lng1 - lng0) * t)
}

fn heading_on_route() -> Option<f64> {
    let (lng0, lat0) = ROUTE[0];
    let (lng1, lat1) = ROUTE[ROUTE.len() - 1];
    Some((lng1 - lng0).atan2(lat1 - lat0).to_degrees())
}
