use hostel_booking::{
    BookingConfig, CatalogSource, DisplaySurface, FormField, HostelApp, JsonCatalog,
    RenderInstruction, SearchCriteria, SimulatedBackend, SortKey, StaticCatalog, TracingNotifier,
    UiEvent,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Prints every render instruction as a JSON line
struct ConsoleSurface;

impl DisplaySurface for ConsoleSurface {
    fn apply(&mut self, instruction: RenderInstruction) {
        match serde_json::to_string(&instruction) {
            Ok(line) => println!("{}", line),
            Err(err) => eprintln!("Failed to serialize render instruction: {}", err),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("HOSTEL_CONFIG") {
        Ok(path) => BookingConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
        Err(_) => BookingConfig::default(),
    };

    let source: Box<dyn CatalogSource> = match std::env::var("HOSTEL_CATALOG") {
        Ok(path) => Box::new(JsonCatalog::File(path.into())),
        Err(_) => Box::new(StaticCatalog),
    };

    let backend = Arc::new(SimulatedBackend::from_config(&config));
    let mut app = HostelApp::start(
        source.as_ref(),
        config,
        backend.clone(),
        Arc::new(TracingNotifier),
        ConsoleSurface,
    )
    .await?;

    info!("Searching for hostels under GHS 3,600, cheapest first");
    app.handle(UiEvent::Search(SearchCriteria {
        destination: "Sunyani".to_string(),
        price_min: None,
        price_max: Some("3600".to_string()),
        sort: SortKey::PriceAscending,
    }));

    let Some(first) = app.catalog().view().ids().first().copied() else {
        info!("No hostels match the search");
        return Ok(());
    };

    app.handle(UiEvent::Book(first));
    let room_type = app
        .dialog()
        .draft()
        .and_then(|draft| draft.listing().room_types().first().cloned());
    if let Some(room_type) = room_type {
        app.handle(UiEvent::SelectRoomType(room_type.to_string()));
    }
    app.handle(UiEvent::SelectTerm("2024-2025".to_string()));

    for (field, value) in [
        (FormField::GuestName, "Ama Mensah"),
        (FormField::Email, "ama@example.com"),
        (FormField::Phone, "0200000000"),
        (FormField::IndexNumber, "UEB1234522"),
    ] {
        app.handle(UiEvent::UpdateField {
            field,
            value: value.to_string(),
        });
    }

    if let Some(pending) = app.handle(UiEvent::Submit) {
        info!("Submitting booking");
        let resolution = app.finish_submission(pending).await;
        info!(?resolution, "Submission finished");
    }

    info!(submitted = backend.submitted_count(), "Demo complete");
    Ok(())
}
