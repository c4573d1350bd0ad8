use super::facet::{DiagnosticsResult, FacetValue};
use serde_json::{json, Value};
use std::path::Path;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Sample CPU, memory, root disk and OS of the machine running the doctor.
///
/// Blocks for at least `MINIMUM_CPU_UPDATE_INTERVAL` while CPU usage is sampled.
pub fn collect_host_facets() -> DiagnosticsResult {
    let mut result = DiagnosticsResult::new();
    let mut sys = System::new();

    sys.refresh_cpu_usage();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();
    result.insert("cpu_percent", FacetValue::from_json(json!(round1(sys.global_cpu_usage() as f64))));

    sys.refresh_memory();
    result.insert(
        "memory",
        FacetValue::from_json(usage_summary(
            sys.total_memory(),
            sys.used_memory(),
            "available",
            sys.available_memory(),
        )),
    );

    let disks = Disks::new_with_refreshed_list();
    let root = disks
        .list()
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .or_else(|| disks.list().first());
    let disk = match root {
        Some(disk) => {
            let total = disk.total_space();
            let free = disk.available_space();
            FacetValue::from_json(usage_summary(total, total.saturating_sub(free), "free", free))
        }
        None => FacetValue::error("Error: no disks reported by the operating system"),
    };
    result.insert("disk", disk);

    let os = System::long_os_version().unwrap_or_default();
    result.insert("os", FacetValue::text_scalar(os));

    result.without_empty()
}

/// `{total, used, <spare_key>, percent}` with percent rounded to one decimal
pub fn usage_summary(total: u64, used: u64, spare_key: &str, spare: u64) -> Value {
    let percent = if total == 0 {
        0.0
    } else {
        round1(used as f64 / total as f64 * 100.0)
    };
    let mut summary = serde_json::Map::new();
    summary.insert("total".to_string(), json!(total));
    summary.insert("used".to_string(), json!(used));
    summary.insert(spare_key.to_string(), json!(spare));
    summary.insert("percent".to_string(), json!(percent));
    Value::Object(summary)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{classify, Verdict};

    #[test]
    fn usage_summary_computes_percent() {
        let summary = usage_summary(2000, 500, "free", 1500);
        assert_eq!(summary["percent"], json!(25.0));
        assert_eq!(summary["free"], json!(1500));
        assert_eq!(usage_summary(0, 0, "free", 0)["percent"], json!(0.0));
    }

    #[test]
    fn nearly_full_disk_fails() {
        let summary = FacetValue::from_json(usage_summary(1000, 950, "free", 50));
        assert_eq!(classify("disk", &summary), Verdict::Failed);
    }

    #[test]
    fn host_facets_are_reported_in_order() {
        let result = collect_host_facets();
        let names = result.names();
        assert_eq!(names.first(), Some(&"cpu_percent"));
        assert!(names.contains(&"memory"));
    }
}
