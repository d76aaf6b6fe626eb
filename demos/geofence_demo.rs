//! Geofence Demo
//!
//! This demo walks a manager through a day of region changes using the
//! in-process simulated monitor.
//!
//! Key concepts:
//! - A region store acting as both data source and delegate
//! - Reloading after the store changes
//! - Entry and exit notifications from a moving device
//! - Refreshing the state of monitored regions
//! - Failure handling and recovery on the next request
//! - Checkpointing and resuming the monitored set
//!
//! Run with: cargo run --example geofence_demo
//! Set RUST_LOG=geofence_manager=debug to see the manager's own logging.

use geofence_manager::checkpoint::ManagerCheckpoint;
use geofence_manager::monitor::{MonitorError, SimulatedMonitor};
use geofence_manager::{
    Coordinate, Geofence, GeofenceDataSource, GeofenceDelegate, GeofenceManager,
    GeofenceManagerBuilder, ManagerError, ManagerState,
};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// Region store owned by the application
#[derive(Default)]
struct RegionStore {
    regions: Mutex<Vec<Geofence>>,
}

impl RegionStore {
    fn save(&self, geofence: Geofence) {
        let mut regions = self.regions.lock().unwrap();
        regions.retain(|existing| existing.identifier() != geofence.identifier());
        regions.push(geofence);
    }

    fn delete(&self, identifier: &str) {
        self.regions
            .lock()
            .unwrap()
            .retain(|existing| existing.identifier() != identifier);
    }
}

impl GeofenceDataSource for RegionStore {
    fn geofences(&self) -> Vec<Geofence> {
        self.regions.lock().unwrap().clone()
    }
}

impl GeofenceDelegate for RegionStore {
    fn on_finished_processing(&self, geofence: &Geofence) {
        println!("  [Monitoring] {}", geofence);
    }

    fn on_inside_region(&self, geofence: &Geofence) {
        println!("  [Inside] {}", geofence.identifier());
    }

    fn on_outside_region(&self, geofence: &Geofence) {
        println!("  [Outside] {}", geofence.identifier());
    }

    fn on_state_changed(&self, state: ManagerState) {
        println!("  [State] {}", state);
    }

    fn on_failed(&self, error: &ManagerError) {
        println!("  [Failed] {}", error);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(RegionStore::default());
    let mut monitor = SimulatedMonitor::new().with_region_limit(3);
    monitor.move_to(Coordinate::new(51.5007, -0.1246));

    let mut manager = GeofenceManager::new(monitor);
    manager.set_data_source(&store);
    manager.set_delegate(&store);

    println!("=== Initial regions ===");
    store.save(Geofence::new("home", Coordinate::new(51.5007, -0.1246), 150.0));
    store.save(Geofence::new("office", Coordinate::new(51.5154, -0.1410), 200.0));
    manager.reload_geofences()?;
    settle(&mut manager);

    println!("\n=== Commute ===");
    manager.monitor_mut().move_to(Coordinate::new(51.5154, -0.1410));
    settle(&mut manager);

    println!("\n=== Refresh ===");
    manager.refresh_geofences()?;
    settle(&mut manager);

    println!("\n=== Platform rejects a region ===");
    manager
        .monitor_mut()
        .fail_region("gym", MonitorError::Platform("region unavailable".into()));
    store.save(Geofence::new("gym", Coordinate::new(51.5080, -0.1281), 80.0));
    manager.reload_geofences()?;
    settle(&mut manager);
    println!("  monitored: {:?}", identifiers(&manager));

    println!("\n=== Recovery ===");
    manager.monitor_mut().clear_failure("gym");
    store.delete("office");
    manager.reload_geofences()?;
    settle(&mut manager);
    println!("  monitored: {:?}", identifiers(&manager));

    println!("\n=== Checkpoint ===");
    let json = manager.checkpoint().to_json()?;
    let path = std::env::temp_dir().join("geofence-demo-checkpoint.json");
    std::fs::write(&path, &json)?;
    println!("  saved to {}", path.display());

    let checkpoint = ManagerCheckpoint::from_json(&std::fs::read_to_string(&path)?)?;
    let resumed = GeofenceManagerBuilder::new()
        .monitor(SimulatedMonitor::new())
        .delegate(&store)
        .data_source(&store)
        .resume_from(checkpoint)
        .build()?;
    println!("  resumed with: {:?}", identifiers(&resumed));
    println!("  transitions so far: {}", resumed.history().transitions().len());

    std::fs::remove_file(&path)?;
    Ok(())
}

fn settle(manager: &mut GeofenceManager<SimulatedMonitor>) {
    while manager.process_events() > 0 {}
}

fn identifiers(manager: &GeofenceManager<SimulatedMonitor>) -> Vec<&str> {
    manager
        .monitored()
        .into_iter()
        .map(Geofence::identifier)
        .collect()
}
