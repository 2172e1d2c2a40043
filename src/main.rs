use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deskauto::{AutomationError, Config, Desktop};

fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!("deskauto starting with {:?} backend", config.backend);

    let desktop = Desktop::from_config(&config).context("Failed to create desktop backend")?;
    log_environment(&desktop)
}

/// Log permissions, displays, cursor and visible windows.
fn log_environment(desktop: &Desktop) -> anyhow::Result<()> {
    for (feature, granted) in report(desktop.check_permissions())?.unwrap_or_default() {
        tracing::info!("Permission {}: {}", feature, if granted { "granted" } else { "missing" });
    }

    if let Some(displays) = report(desktop.display().all())? {
        for monitor in displays {
            tracing::info!(
                "Display {} '{}' at {:?} scale {} {}",
                monitor.id,
                monitor.name,
                monitor.bounds,
                monitor.scale,
                if monitor.is_primary { "(primary)" } else { "" }
            );
        }
    }

    if let Some(rect) = report(desktop.display().virtual_rect())? {
        tracing::info!("Virtual screen: {:?}", rect);
    }

    if let Some(cursor) = report(desktop.mouse().position())? {
        tracing::info!("Cursor at ({}, {})", cursor.x, cursor.y);
    }

    if let Some(windows) = report(desktop.window().list(true))? {
        tracing::info!("{} visible windows", windows.len());
        for window in windows {
            tracing::info!("  [{}] {}", window.handle, window.display_name());
        }
    }

    Ok(())
}

/// Capability gaps are logged and skipped; anything else aborts.
fn report<T>(result: deskauto::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ (AutomationError::Capability { .. } | AutomationError::PermissionDenied { .. })) => {
            tracing::warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use deskauto::desktop::MemoryBackend;

    #[test]
    fn test_report_skips_capability_gaps() {
        let skipped = report::<()>(Err(AutomationError::capability("hooks", "native"))).unwrap();
        assert!(skipped.is_none());
        let skipped =
            report::<()>(Err(AutomationError::permission_denied("input", "grant access"))).unwrap();
        assert!(skipped.is_none());
        assert_eq!(report(Ok(7)).unwrap(), Some(7));
    }

    #[test]
    fn test_report_propagates_backend_failures() {
        let err = report::<()>(Err(AutomationError::Backend("x11 gone".into()))).unwrap_err();
        assert!(err.to_string().contains("x11 gone"));
    }

    #[test]
    fn test_log_environment_on_memory_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let desktop = Desktop::new(backend.clone());
        log_environment(&desktop).unwrap();

        backend.unsupported("list_windows");
        log_environment(&desktop).unwrap();

        backend.fail("displays");
        assert!(log_environment(&desktop).is_err());
    }
}
