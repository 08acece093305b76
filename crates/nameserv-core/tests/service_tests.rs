//! Integration tests for the RegistryService public interface.
//!
//! These drive the service the way a client library would: bind, poll for
//! changes, renew, and resync after a restart.

use std::sync::Arc;
use std::time::Duration;

use nameserv_core::{
    DumpFormat, ErrorKind, Extras, ManualClock, NameServerConfig, RebindInfo, RebindResult,
    ReaperState, RegistryService, ServiceRef, WellKnownPaths,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Service with a manual clock and a fixed cookie.
fn create_test_service(cookie: u64) -> (RegistryService, Arc<ManualClock>) {
    init_tracing();
    let clock = Arc::new(ManualClock::starting_now());
    let service = RegistryService::builder()
        .clock(clock.clone())
        .cookie(cookie)
        .build();
    (service, clock)
}

fn bind(service: &RegistryService, path: &str, tag: &str) {
    service
        .bind_obj(path, "", Extras::default(), ServiceRef::from(tag))
        .unwrap();
}

#[test]
fn test_log_server_scenario() {
    let (service, _) = create_test_service(1);
    service.create_scope_path("/CIDLib", "CIDLib Scope").unwrap();
    service
        .create_scope("/CIDLib", "CIDLogSrv", "Log Server Scope")
        .unwrap();
    bind(&service, "/CIDLib/CIDLogSrv/Primary", "R1");

    let bindings = service.enum_objects("/CIDLib/CIDLogSrv", true).unwrap();
    let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Primary"]);

    let reply = service.get_object("/CIDLib/CIDLogSrv/Primary").unwrap();
    assert_eq!(reply.service_ref, Some(ServiceRef::from("R1")));
}

#[test]
fn test_duplicate_bind_fails_but_rebind_overwrites() {
    let (service, _) = create_test_service(9);
    bind(&service, "/svc/a", "R1");

    let err = service
        .bind_obj("/svc/a", "", Extras::default(), ServiceRef::from("R2"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let items = vec![RebindInfo::new("/svc/a", "", Extras::default(), ServiceRef::from("R2")).unwrap()];
    let reply = service.rebind_objects(&items, 9);
    assert!(reply.ok);
    assert_eq!(reply.results, vec![RebindResult::Success]);
    assert_eq!(
        service.get_object("/svc/a").unwrap().service_ref,
        Some(ServiceRef::from("R2"))
    );
}

#[test]
fn test_permanent_binding_survives_lease_expiry() {
    let (service, clock) = create_test_service(1);
    bind(&service, "/svc/a", "R1");
    service.mark_permanent("/svc/a").unwrap();

    clock.advance(service.config().lease_duration + Duration::from_secs(1));
    assert!(service.sweep_expired().is_empty());
    assert!(service.binding_exists("/svc/a").unwrap().found);
}

#[test]
fn test_unrenewed_binding_is_evicted() {
    let (service, clock) = create_test_service(1);
    bind(&service, "/svc/a", "R1");
    let serial = service
        .query_scope_keys("/svc", 0, false, true)
        .unwrap()
        .unwrap()
        .serial;

    clock.advance(service.config().lease_duration + Duration::from_secs(1));
    assert_eq!(service.sweep_expired(), vec!["/svc/a".to_string()]);
    assert!(!service.binding_exists("/svc/a").unwrap().found);

    // Eviction is a structural change like any other
    let keys = service
        .query_scope_keys("/svc", serial, false, true)
        .unwrap()
        .unwrap();
    assert!(keys.changed);
    assert!(keys.serial > serial);
    assert!(keys.names.is_empty());
}

#[test]
fn test_clock_rollback_resets_binding() {
    let (service, clock) = create_test_service(1);
    bind(&service, "/svc/a", "R1");
    clock.set(chrono::Utc::now() - chrono::Duration::hours(1));
    assert_eq!(service.sweep_expired().len(), 1);
}

#[test]
fn test_serial_stable_until_mutation() {
    let (service, _) = create_test_service(1);
    bind(&service, "/svc/a", "R1");

    let first = service.query_scope_keys("/svc", 0, false, true).unwrap().unwrap();
    let again = service
        .query_scope_keys("/svc", first.serial, false, true)
        .unwrap()
        .unwrap();
    let third = service
        .query_scope_keys("/svc", first.serial, false, true)
        .unwrap()
        .unwrap();
    assert!(!again.changed);
    assert!(!third.changed);
    assert_eq!(third.serial, first.serial);

    bind(&service, "/svc/b", "R2");
    let after_add = service
        .query_scope_keys("/svc", first.serial, false, true)
        .unwrap()
        .unwrap();
    assert!(after_add.changed);
    assert!(after_add.serial > first.serial);
    assert_eq!(after_add.names, vec!["a", "b"]);

    service.remove_binding("/svc/a", true).unwrap();
    let after_remove = service
        .query_scope_keys("/svc", after_add.serial, true, true)
        .unwrap()
        .unwrap();
    assert!(after_remove.serial > after_add.serial);
    assert_eq!(after_remove.names, vec!["b"]);
}

#[test]
fn test_restart_is_detected_through_cookie() {
    let (old_server, _) = create_test_service(100);
    bind(&old_server, "/svc/a", "R1");
    let client_cookie = old_server.get_object("/svc/a").unwrap().cookie;

    // Simulated restart: fresh state, new cookie
    let (new_server, _) = create_test_service(200);
    let items =
        vec![RebindInfo::new("/svc/a", "", Extras::default(), ServiceRef::from("R1")).unwrap()];

    let stale = new_server.rebind_objects(&items, client_cookie);
    assert!(!stale.ok);
    assert_eq!(stale.cookie, 200);
    let stale_renew = new_server.renew_leases(&["/svc/a".to_string()], client_cookie);
    assert!(!stale_renew.ok);
    assert_eq!(stale_renew.cookie, 200);

    let fresh = new_server.rebind_objects(&items, stale.cookie);
    assert!(fresh.ok);
    let renewed = new_server.renew_leases(&["/svc/a".to_string()], stale.cookie);
    assert!(renewed.ok);
    assert_eq!(renewed.results, vec![true]);
}

#[test]
fn test_recursive_scope_removal() {
    let (service, _) = create_test_service(1);
    bind(&service, "/a/b/c/d", "R1");
    bind(&service, "/a/x", "R2");

    service.remove_scope("/a/b").unwrap();
    assert!(!service.scope_exists("/a/b/c").unwrap().found);
    assert!(!service.binding_exists("/a/b/c/d").unwrap().found);
    assert!(service.binding_exists("/a/x").unwrap().found);

    assert_eq!(
        service.remove_scope("/").unwrap_err().kind(),
        ErrorKind::BadRequest
    );
}

#[test]
fn test_dump_of_very_deep_scope_path() {
    const DEPTH: usize = 2_000;
    let (service, _) = create_test_service(1);
    let deep = "/n".repeat(DEPTH);
    service.create_scope_path(&deep, "bottom").unwrap();
    let service = Arc::new(service);

    // Tighter than a tokio worker stack
    let worker = Arc::clone(&service);
    let (text, xml) = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || (worker.dump(DumpFormat::Text), worker.dump(DumpFormat::Xml)))
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(text.matches("Scope=n").count(), DEPTH);
    assert!(text.contains("'bottom'"));
    assert_eq!(xml.matches("<NS:Scope Name='n'>").count(), DEPTH);
    assert_eq!(xml.matches("</NS:Scope>").count(), DEPTH + 1);
    assert!(service.scope_exists(&deep).unwrap().found);
}

#[test]
fn test_reaper_thread_evicts_expired_bindings() {
    init_tracing();
    let clock = Arc::new(ManualClock::starting_now());
    let config = NameServerConfig::default()
        .with_lease_duration(Duration::from_secs(60))
        .with_reaper_interval(Duration::from_millis(20));
    let service = RegistryService::builder()
        .clock(clock.clone())
        .config(config)
        .build();
    service.initialize(ServiceRef::from("admin")).unwrap();
    assert!(service.reaper_state().is_some());

    bind(&service, "/svc/temp", "R1");
    bind(&service, "/svc/keep", "R2");
    service.mark_permanent("/svc/keep").unwrap();
    clock.advance(Duration::from_secs(61));

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while service.binding_exists("/svc/temp").unwrap().found
        && std::time::Instant::now() < deadline
    {
        std::thread::sleep(Duration::from_millis(10));
    }

    assert!(!service.binding_exists("/svc/temp").unwrap().found);
    assert!(service.binding_exists("/svc/keep").unwrap().found);
    // The admin binding is permanent
    assert!(service
        .binding_exists(WellKnownPaths::ADMIN_BINDING)
        .unwrap()
        .found);

    service.terminate();
    assert_eq!(service.reaper_state(), None);
}

#[test]
fn test_reaper_state_while_running() {
    init_tracing();
    let service = RegistryService::builder()
        .config(NameServerConfig::default().with_reaper_interval(Duration::from_secs(60)))
        .build();
    service.initialize(ServiceRef::from("admin")).unwrap();
    assert_eq!(service.reaper_state(), Some(ReaperState::Sleeping));
    service.terminate();
}
