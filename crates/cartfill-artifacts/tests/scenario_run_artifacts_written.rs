//! Scenario: run artifacts land in exports/<run_id>/ with a manifest, the
//! full report, and one outcomes.csv row per line in input order.

use cartfill_artifacts::{write_run_artifacts, RunManifest, WriteRunArtifactsArgs};
use cartfill_schemas::{
    AuthFailure, CandidateId, FailureStage, LineFailure, LineOutcome, LineRecord, OrderLine,
    PortError, Quantity, ResolutionOutcome, ResolutionPath, RunReport, RunStatus,
};
use chrono::Utc;
use uuid::Uuid;

fn report() -> RunReport {
    let now = Utc::now();
    RunReport {
        run_id: Uuid::new_v4(),
        started_at_utc: now,
        finished_at_utc: now,
        status: RunStatus::Completed,
        records: vec![
            LineRecord {
                position: 1,
                line: OrderLine::new("A100B", "2", "HLP1").unwrap(),
                outcome: LineOutcome::Resolved(ResolutionOutcome::Fulfilled {
                    path: ResolutionPath::Fallback,
                    candidate: CandidateId::new("h-1"),
                    variant_code: "A100B".to_string(),
                    quantity: Quantity::parse("2").unwrap(),
                }),
                commits: 1,
            },
            LineRecord {
                position: 2,
                line: OrderLine::new("B200", "1", "").unwrap(),
                outcome: LineOutcome::Failed(LineFailure::Transport {
                    stage: FailureStage::PrimarySearch,
                    error: PortError::Transport("connection reset".to_string()),
                }),
                commits: 0,
            },
            LineRecord {
                position: 3,
                line: OrderLine::new("C300", "1", "HLP3").unwrap(),
                outcome: LineOutcome::Resolved(ResolutionOutcome::SoldOut),
                commits: 0,
            },
        ],
    }
}

#[test]
fn writes_manifest_report_and_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let report = report();

    let res = write_run_artifacts(WriteRunArtifactsArgs {
        exports_root: dir.path(),
        mode: "PAPER",
        config_hash: "abc123",
        host_fingerprint: "test-host",
        report: &report,
    })
    .unwrap();

    assert_eq!(res.run_dir, dir.path().join(report.run_id.to_string()));

    let manifest: RunManifest =
        serde_json::from_str(&std::fs::read_to_string(&res.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest.run_id, report.run_id);
    assert_eq!(manifest.mode, "PAPER");
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.artifacts.outcomes_csv, "outcomes.csv");

    let back: RunReport =
        serde_json::from_str(&std::fs::read_to_string(&res.report_path).unwrap()).unwrap();
    assert_eq!(back, report);

    let csv = std::fs::read_to_string(&res.outcomes_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "position,primary_code,quantity,fallback_code,outcome,path,variant_code,detail"
    );
    assert_eq!(lines[1], "1,A100B,2,HLP1,FULFILLED,fallback,A100B,candidate=h-1");
    assert_eq!(
        lines[2],
        "2,B200,1,,FAILED,,,primary_search failed: transport error: connection reset"
    );
    assert_eq!(lines[3], "3,C300,1,HLP3,SOLD_OUT,,,");
    assert_eq!(lines.len(), 4);
}

#[test]
fn session_failure_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();
    let report = RunReport {
        run_id: Uuid::new_v4(),
        started_at_utc: now,
        finished_at_utc: now,
        status: RunStatus::SessionFailed(AuthFailure::BadCredentials),
        records: vec![],
    };

    let res = write_run_artifacts(WriteRunArtifactsArgs {
        exports_root: dir.path(),
        mode: "LIVE",
        config_hash: "h",
        host_fingerprint: "f",
        report: &report,
    })
    .unwrap();

    let csv = std::fs::read_to_string(&res.outcomes_path).unwrap();
    assert_eq!(csv.lines().count(), 1);
    let manifest = std::fs::read_to_string(&res.manifest_path).unwrap();
    assert!(manifest.contains("session_failed"));
}
