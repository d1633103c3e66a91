//! Report wire-format vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use extstats_core::report::{decode_report, Report};

use vector_loader::load;

#[test]
fn report_vectors() {
    let files = [
        "report_install.json",
        "report_install_extra_fields.json",
        "report_install_missing_client.json",
        "report_install_empty_client.json",
        "report_filter_default_count.json",
        "report_filter_count.json",
        "report_filter_zero.json",
        "report_filter_negative.json",
        "report_filter_float.json",
        "report_filter_fraction.json",
        "report_unknown_type.json",
        "report_not_json.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_report(v.body.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let report = res.expect("expected ok report");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(report.kind().as_str(), ex["type"].as_str().unwrap(), "vector={}", v.description);
        match report {
            Report::Install { client_id } => {
                assert_eq!(client_id, ex["clientId"].as_str().unwrap(), "vector={}", v.description);
            }
            Report::Filter { count } => {
                assert_eq!(count, ex["count"].as_u64().unwrap(), "vector={}", v.description);
            }
        }
    }
}
