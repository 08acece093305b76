//! Basic usage of the name server library.
//!
//! Run with: cargo run --example basic_usage -p nameserv-core

use nameserv_core::{DumpFormat, Extras, RebindInfo, RegistryService, ServiceRef};

fn main() -> nameserv_core::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let service = RegistryService::new();
    service.initialize(ServiceRef::from("127.0.0.1:13502"))?;

    let mut extras = Extras::default();
    extras[0] = "tcp".to_string();
    service.bind_obj(
        "/CIDLib/CIDLogSrv/Primary",
        "Primary log server",
        extras,
        ServiceRef::from("10.0.0.4:13503"),
    )?;

    let lookup = service.get_object("/CIDLib/CIDLogSrv/Primary")?;
    println!("Found: {} (cookie {})", lookup.found, lookup.cookie);

    // What a client does periodically: renew, and rebind after a restart
    let renew = service.renew_leases(&["/CIDLib/CIDLogSrv/Primary".to_string()], lookup.cookie);
    println!("Renewed: {:?}", renew.results);

    let items = vec![RebindInfo::new(
        "/CIDLib/CIDLogSrv/Primary",
        "Primary log server",
        Extras::default(),
        ServiceRef::from("10.0.0.5:13503"),
    )?];
    let rebind = service.rebind_objects(&items, service.query_cookie());
    println!("Rebind: {:?}", rebind.results);

    println!("{}", service.dump(DumpFormat::Text));

    service.terminate();
    Ok(())
}
