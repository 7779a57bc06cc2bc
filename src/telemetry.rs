use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{logs::SdkLoggerProvider, trace::SdkTracerProvider, Resource};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const SERVICE_NAME: &str = "quotebox";

/// keeps the otlp exporters alive; flushes them on [`TelemetryGuard::shutdown`].
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    log_provider: Option<SdkLoggerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        if let Some(tracer_provider) = self.tracer_provider {
            if let Err(e) = tracer_provider.shutdown() {
                eprintln!("an error occurred when shutting down the tracer provider: {e:?}");
            }
        }

        if let Some(log_provider) = self.log_provider {
            if let Err(e) = log_provider.shutdown() {
                eprintln!("an error occurred when shutting down the logger provider: {e:?}");
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// names this process for the collector. `OTEL_SERVICE_NAME` and `OTEL_SERVICE_VERSION`
/// override the crate's own name and version.
fn service_resource() -> Resource {
    let name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());
    let version =
        env::var("OTEL_SERVICE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    Resource::builder()
        .with_service_name(name)
        .with_attribute(KeyValue::new("service.version", version))
        .build()
}

/// batch providers for spans and log records, both shipped over grpc to `endpoint`.
fn otlp_providers(endpoint: &str) -> anyhow::Result<(SdkTracerProvider, SdkLoggerProvider)> {
    let resource = service_resource();

    let spans = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(spans)
        .build();

    let logs = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;
    let log_provider = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(logs)
        .build();

    Ok((tracer_provider, log_provider))
}

/// installs the global subscriber. spans and logs are exported over otlp only when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set; otherwise everything goes to stdout.
pub fn init_telemetry() -> anyhow::Result<TelemetryGuard> {
    let subscriber = Registry::default()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer());

    let Ok(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        subscriber.try_init()?;

        tracing::info!("no OTEL_EXPORTER_OTLP_ENDPOINT set, logging to stdout only.");
        return Ok(TelemetryGuard::default());
    };

    let (tracer_provider, log_provider) = otlp_providers(&endpoint)?;
    global::set_tracer_provider(tracer_provider.clone());

    subscriber
        .with(tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(SERVICE_NAME)))
        .with(OpenTelemetryTracingBridge::new(&log_provider))
        .try_init()?;

    tracing::info!(endpoint = %endpoint, "exporting traces and logs over otlp.");

    Ok(TelemetryGuard {
        tracer_provider: Some(tracer_provider),
        log_provider: Some(log_provider),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_the_service() {
        let resource = service_resource();

        let name = resource
            .get(&opentelemetry::Key::from_static_str("service.name"))
            .map(|value| value.to_string());

        assert!(name.is_some_and(|name| !name.is_empty()));
    }
}
