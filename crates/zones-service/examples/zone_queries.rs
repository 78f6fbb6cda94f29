//! Walkthrough: build a zone service from the environment, register a
//! couple of zones, and run the query surface.
//!
//! Run with: cargo run -p zones-service --example zone_queries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zones_core::{CreateZoneRequest, Point};
use zones_service::{Config, ZoneService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zones_service=debug".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let service = ZoneService::from_config(&config).await?;

    let downtown = service
        .create_zone(CreateZoneRequest {
            name: "Downtown".to_string(),
            boundary: vec![
                Point::new(37.76, -122.45),
                Point::new(37.76, -122.40),
                Point::new(37.80, -122.40),
                Point::new(37.80, -122.45),
            ],
            center: None,
            estimated_delivery_time_minutes: 25,
            delivery_fee: 3.49,
            metadata: Default::default(),
        })
        .await?;

    service
        .create_zone(CreateZoneRequest {
            name: "Mission".to_string(),
            boundary: vec![
                Point::new(37.74, -122.43),
                Point::new(37.74, -122.40),
                Point::new(37.77, -122.40),
                Point::new(37.77, -122.43),
            ],
            center: None,
            estimated_delivery_time_minutes: 30,
            delivery_fee: 3.99,
            metadata: Default::default(),
        })
        .await?;

    let customer = Point::new(37.765, -122.41);
    let containing = service.find_zones_containing_point(&customer).await;
    tracing::info!(
        count = containing.len(),
        zones = ?containing.iter().map(|z| z.name.as_str()).collect::<Vec<_>>(),
        "zones containing the customer point"
    );

    let nearby = service.find_zones_within_radius(&downtown.geofence.center, 5_000.0);
    tracing::info!(count = nearby.len(), "zone centers within 5km of downtown");

    let restaurant = Point::new(37.79, -122.42);
    tracing::info!(
        fee = service.estimate_delivery_fee(&restaurant, &customer),
        minutes = service.estimate_delivery_time(&restaurant, &customer),
        "quote for restaurant -> customer"
    );

    Ok(())
}
