// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{PoolingMethod, Session, SessionConfig};
use crate::errors::{PoolError, SessionError};
use crate::extractors::stub::{
    failing_descriptor, panicking_descriptor, probed_descriptor, test_picture, unbuildable_descriptor, Probe,
    ProbeOptions,
};
use crate::extractors::ExtractorRegistry;
use crate::frame::{Picture, PictureGeometry};
use crate::model::LinearModel;
use crate::output::OutputFormat;

/// Integration tests for sessions driving real and probed extractors
#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [usize; 3] = [0, 1, 4];

    fn builtin() -> Arc<ExtractorRegistry> {
        Arc::new(ExtractorRegistry::builtin())
    }

    fn registry_with(probes: Vec<crate::extractors::ExtractorDescriptor>) -> Arc<ExtractorRegistry> {
        let mut registry = ExtractorRegistry::builtin();
        for descriptor in probes {
            registry.register(descriptor).expect("Failed to register test extractor");
        }
        Arc::new(registry)
    }

    fn frame(index: u32) -> (Picture, Picture) {
        let geometry = PictureGeometry::new(16, 8, 8);
        let luma: Vec<u16> = (0..geometry.sample_count())
            .map(|i| ((i as u32 * 7 + index * 13) % 256) as u16)
            .collect();
        let noisy: Vec<u16> = luma.iter().enumerate().map(|(i, v)| (v + (i as u16 % 3)).min(255)).collect();
        (
            Picture::new(geometry, luma).expect("Failed to build reference"),
            Picture::new(geometry, noisy).expect("Failed to build distorted"),
        )
    }

    fn seeded_session(subsample: u32, scores: &[f64]) -> (Session, LinearModel) {
        let mut session = Session::init(SessionConfig::new(0, subsample), builtin()).unwrap();
        for (index, score) in scores.iter().enumerate() {
            session.import_feature_score("score", *score, index as u32).unwrap();
        }
        (session, LinearModel::new("identity", 0.0).with_feature("score", 1.0))
    }

    #[test]
    fn test_init_then_close_in_every_mode() {
        for threads in MODES {
            let session = Session::init(SessionConfig::new(threads, 1), builtin())
                .unwrap_or_else(|e| panic!("init with {} threads failed: {}", threads, e));
            assert_eq!(session.is_concurrent(), threads > 0);
            session.close().unwrap();
        }
    }

    #[test]
    fn test_close_releases_every_context_and_picture() {
        for threads in MODES {
            let (spatial, spatial_counts) = probed_descriptor(
                "spatial",
                "spatial_value",
                ProbeOptions {
                    delay: Duration::from_millis(2),
                    ..ProbeOptions::default()
                },
            );
            let (temporal, temporal_counts) = probed_descriptor(
                "temporal",
                "temporal_value",
                ProbeOptions {
                    temporal: true,
                    stateful: true,
                    ..ProbeOptions::default()
                },
            );
            let mut session =
                Session::init(SessionConfig::new(threads, 1), registry_with(vec![spatial, temporal])).unwrap();
            session.use_feature("spatial").unwrap();
            session.use_feature("temporal").unwrap();

            let mut kept = Vec::new();
            for index in 0..6 {
                let (reference, distorted) = frame(index);
                kept.push((reference.clone(), distorted.clone()));
                session.submit_frame_pair(reference, distorted, index).unwrap();
            }
            session.close().unwrap();

            for counts in [&spatial_counts, &temporal_counts] {
                let created = Probe::get(&counts.created);
                assert!(created > 0, "threads={}", threads);
                assert_eq!(Probe::get(&counts.dropped), created, "threads={}", threads);
                assert_eq!(Probe::get(&counts.closed), Probe::get(&counts.initialized), "threads={}", threads);
                assert_eq!(Probe::get(&counts.extractions), 6, "threads={}", threads);
            }
            for (reference, distorted) in &kept {
                assert_eq!(reference.ref_count(), 1, "threads={}", threads);
                assert_eq!(distorted.ref_count(), 1, "threads={}", threads);
            }
        }
    }

    #[test]
    fn test_one_entry_per_binding_and_index() {
        let (spatial, _) = probed_descriptor("spatial", "spatial_value", ProbeOptions::default());
        let mut session = Session::init(SessionConfig::default(), registry_with(vec![spatial])).unwrap();
        session.use_feature("spatial").unwrap();
        session.use_feature("psnr").unwrap();

        for index in 0..5 {
            let (reference, distorted) = frame(index);
            session.submit_frame_pair(reference, distorted, index).unwrap();
        }

        assert_eq!(session.collector().len(), 10);
        for index in 0..5 {
            assert!(session.collector().contains("spatial_value", index));
            assert!(session.collector().contains("psnr_y", index));
        }
        session.close().unwrap();
    }

    #[test]
    fn test_subsampling_skips_only_non_temporal() {
        for threads in MODES {
            let (spatial, spatial_probe) = probed_descriptor("spatial", "spatial_value", ProbeOptions::default());
            let (temporal, _) = probed_descriptor(
                "temporal",
                "temporal_value",
                ProbeOptions {
                    temporal: true,
                    ..ProbeOptions::default()
                },
            );
            let mut session =
                Session::init(SessionConfig::new(threads, 3), registry_with(vec![spatial, temporal])).unwrap();
            session.use_feature("spatial").unwrap();
            session.use_feature("temporal").unwrap();

            for index in 0..8 {
                session.submit_frame_pair(test_picture(1), test_picture(2), index).unwrap();
            }
            session.drain().unwrap();

            let collector = session.collector();
            for index in 0..8 {
                assert_eq!(
                    collector.contains("spatial_value", index),
                    index % 3 == 0,
                    "threads={} index={}",
                    threads,
                    index
                );
                assert!(collector.contains("temporal_value", index), "threads={} index={}", threads, index);
            }
            assert_eq!(spatial_probe.seen_sorted(), vec![0, 3, 6]);
            session.close().unwrap();
        }
    }

    #[test]
    fn test_concurrent_results_match_synchronous() {
        let run = |threads: usize| {
            let (stateful, _) = probed_descriptor(
                "stateful",
                "frames_seen",
                ProbeOptions {
                    temporal: true,
                    stateful: true,
                    ..ProbeOptions::default()
                },
            );
            let (slow, _) = probed_descriptor(
                "slow",
                "slow_value",
                ProbeOptions {
                    scale: 0.5,
                    delay: Duration::from_millis(1),
                    ..ProbeOptions::default()
                },
            );
            let mut session =
                Session::init(SessionConfig::new(threads, 2), registry_with(vec![stateful, slow])).unwrap();
            for name in ["psnr", "motion", "stateful", "slow"] {
                session.use_feature(name).unwrap();
            }
            for index in 0..12 {
                let (reference, distorted) = frame(index);
                session.submit_frame_pair(reference, distorted, index).unwrap();
            }
            session.drain().unwrap();
            let snapshot = session.collector().snapshot();
            session.close().unwrap();
            snapshot
        };

        let synchronous = run(0);
        assert!(!synchronous.is_empty());
        for threads in [1, 3, 8] {
            assert_eq!(run(threads), synchronous, "threads={}", threads);
        }
    }

    #[test]
    fn test_pooled_mean_and_harmonic_mean() {
        struct TestCase {
            method: PoolingMethod,
            expected: f64,
        }

        let test_cases = vec![
            TestCase {
                method: PoolingMethod::Mean,
                expected: 25.0,
            },
            TestCase {
                method: PoolingMethod::HarmonicMean,
                expected: 4.0 / (1.0 / 11.0 + 1.0 / 21.0 + 1.0 / 31.0 + 1.0 / 41.0) - 1.0,
            },
            TestCase {
                method: PoolingMethod::Min,
                expected: 10.0,
            },
        ];

        for case in test_cases {
            let (mut session, model) = seeded_session(1, &[10.0, 20.0, 30.0, 40.0]);
            let score = session.score_pooled(&model, case.method, 0, 4).unwrap();
            assert!((score - case.expected).abs() < 1e-9, "{}: {}", case.method, score);
            session.close().unwrap();
        }
    }

    #[test]
    fn test_pooled_min_is_true_minimum() {
        let (mut session, model) = seeded_session(1, &[30.0, 10.0, 40.0, 20.0]);
        assert_eq!(session.score_pooled(&model, PoolingMethod::Min, 0, 4).unwrap(), 10.0);
    }

    #[test]
    fn test_pooled_range_must_be_non_empty() {
        let (mut session, model) = seeded_session(1, &[10.0, 20.0]);
        assert!(session
            .score_pooled(&model, PoolingMethod::Mean, 1, 1)
            .unwrap_err()
            .is_invalid_argument());
        assert!(session
            .score_pooled(&model, PoolingMethod::Mean, 2, 1)
            .unwrap_err()
            .is_invalid_argument());
        // Rejected ranges do not finalize the session.
        assert!(!session.is_finalized());
    }

    #[test]
    fn test_pooled_score_follows_subsample() {
        let (mut session, model) = seeded_session(2, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(session.score_pooled(&model, PoolingMethod::Mean, 0, 4).unwrap(), 20.0);
        assert!(session
            .score_pooled(&model, PoolingMethod::Mean, 1, 2)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_pooled_score_surfaces_missing_feature() {
        let (mut session, _) = seeded_session(1, &[10.0, 20.0]);
        let model = LinearModel::new("needs_more", 0.0).with_feature("score", 1.0).with_feature("absent", 1.0);
        match session.score_pooled(&model, PoolingMethod::Mean, 0, 2).unwrap_err() {
            SessionError::Predict(err) => assert!(err.to_string().contains("absent")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_pooled_score_from_real_extractors() {
        for threads in MODES {
            let model = LinearModel::new("psnr_motion", 0.0)
                .with_feature("psnr_y", 1.0)
                .with_feature("motion_score", 0.0);
            let mut session = Session::init(SessionConfig::new(threads, 1), builtin()).unwrap();
            session.use_features_from_model(&model).unwrap();
            assert_eq!(session.binding_names(), vec!["psnr", "motion"]);

            for index in 0..6 {
                let (reference, distorted) = frame(index);
                session.submit_frame_pair(reference, distorted, index).unwrap();
            }
            let score = session.score_pooled(&model, PoolingMethod::Mean, 0, 6).unwrap();
            assert!(score.is_finite() && score > 0.0, "threads={} score={}", threads, score);
            session.close().unwrap();
        }
    }

    #[test]
    fn test_context_never_shared_between_running_tasks() {
        let (spatial, spatial_probe) = probed_descriptor(
            "spatial",
            "spatial_value",
            ProbeOptions {
                delay: Duration::from_millis(2),
                ..ProbeOptions::default()
            },
        );
        let (temporal, temporal_probe) = probed_descriptor(
            "temporal",
            "temporal_value",
            ProbeOptions {
                temporal: true,
                delay: Duration::from_millis(1),
                ..ProbeOptions::default()
            },
        );
        let mut session =
            Session::init(SessionConfig::new(4, 1), registry_with(vec![spatial, temporal])).unwrap();
        session.use_feature("spatial").unwrap();
        session.use_feature("temporal").unwrap();

        for index in 0..32 {
            session.submit_frame_pair(test_picture(1), test_picture(2), index).unwrap();
        }
        session.drain().unwrap();

        assert_eq!(Probe::get(&spatial_probe.violations), 0);
        assert_eq!(Probe::get(&temporal_probe.violations), 0);
        assert!(Probe::get(&spatial_probe.max_active) <= 4);
        assert_eq!(Probe::get(&temporal_probe.max_active), 1);
        // One binding context plus at most one pooled context per thread.
        assert!(Probe::get(&spatial_probe.created) <= 5);
        assert_eq!(Probe::get(&temporal_probe.created), 2);
        assert_eq!(Probe::get(&spatial_probe.extractions), 32);
        session.close().unwrap();
    }

    #[test]
    fn test_every_initialized_context_closed_once() {
        for threads in MODES {
            let (spatial, probe) = probed_descriptor("spatial", "spatial_value", ProbeOptions::default());
            let mut session = Session::init(SessionConfig::new(threads, 1), registry_with(vec![spatial])).unwrap();
            session.use_feature("spatial").unwrap();
            for index in 0..10 {
                session.submit_frame_pair(test_picture(1), test_picture(2), index).unwrap();
            }
            session.close().unwrap();

            assert!(Probe::get(&probe.initialized) >= 1, "threads={}", threads);
            assert_eq!(
                Probe::get(&probe.closed),
                Probe::get(&probe.initialized),
                "threads={}",
                threads
            );
        }
    }

    #[test]
    fn test_no_picture_references_outlive_session() {
        for threads in MODES {
            let (reference, distorted) = frame(0);
            let mut session = Session::init(SessionConfig::new(threads, 1), builtin()).unwrap();
            session.use_feature("psnr").unwrap();
            session.use_feature("motion").unwrap();

            for index in 0..6 {
                session.submit_frame_pair(reference.clone(), distorted.clone(), index).unwrap();
            }
            session.close().unwrap();

            assert_eq!(reference.ref_count(), 1, "threads={}", threads);
            assert_eq!(distorted.ref_count(), 1, "threads={}", threads);
        }
    }

    #[test]
    fn test_drop_without_close_releases_everything() {
        let (reference, distorted) = frame(0);
        {
            let mut session = Session::init(SessionConfig::new(2, 1), builtin()).unwrap();
            session.use_feature("motion").unwrap();
            for index in 0..4 {
                session.submit_frame_pair(reference.clone(), distorted.clone(), index).unwrap();
            }
        }
        assert_eq!(reference.ref_count(), 1);
        assert_eq!(distorted.ref_count(), 1);
    }

    #[test]
    fn test_score_at_largest_index() {
        let mut session = Session::init(SessionConfig::default(), builtin()).unwrap();
        session.import_feature_score("external", 2.0, 0).unwrap();
        session.import_feature_score("external", 4.0, u32::MAX).unwrap();
        assert_eq!(session.collector().get("external", u32::MAX), Some(4.0));

        let mut sink = Vec::new();
        session.write_output(&mut sink, &OutputFormat::Json).unwrap();
        let report: serde_json::Value = serde_json::from_slice(&sink).unwrap();
        let frames = report["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1]["frameNum"], u64::from(u32::MAX));
        assert_eq!(report["pooled_metrics"]["external"]["mean"], 3.0);
        session.close().unwrap();
    }

    #[test]
    fn test_unknown_output_format_is_noop() {
        let mut session = Session::init(SessionConfig::default(), builtin()).unwrap();
        session.use_feature("psnr").unwrap();
        let (reference, distorted) = frame(0);
        session.submit_frame_pair(reference, distorted, 0).unwrap();

        let mut sink = Vec::new();
        session
            .write_output(&mut sink, &OutputFormat::Unknown("sub".into()))
            .unwrap();
        assert!(sink.is_empty());
        assert!(session.is_finalized());
    }

    #[test]
    fn test_xml_output_after_concurrent_run() {
        let mut session = Session::init(SessionConfig::new(2, 2), builtin()).unwrap();
        session.use_feature("psnr").unwrap();
        session.use_feature("motion").unwrap();
        for index in 0..4 {
            let (reference, distorted) = frame(index);
            session.submit_frame_pair(reference, distorted, index).unwrap();
        }

        let mut sink = Vec::new();
        session.write_output(&mut sink, &OutputFormat::Xml).unwrap();
        let xml = String::from_utf8(sink).unwrap();

        assert!(xml.contains("<params subsample=\"2\"/>"));
        assert!(xml.contains("<frame frameNum=\"0\""));
        assert!(xml.contains("<frame frameNum=\"2\""));
        assert!(!xml.contains("<frame frameNum=\"1\""));
        assert!(xml.contains("<metric name=\"psnr_y\""));
        assert!(xml.contains("<metric name=\"motion_score\""));
    }

    #[test]
    fn test_concurrent_error_latched_until_drain() {
        let failing = failing_descriptor("flaky", "flaky_value", &[2, 4]);
        let mut session = Session::init(SessionConfig::new(2, 1), registry_with(vec![failing])).unwrap();
        session.use_feature("flaky").unwrap();

        for index in 0..6 {
            // Enqueueing succeeds even for frames whose extraction fails.
            session.submit_frame_pair(test_picture(1), test_picture(1), index).unwrap();
        }

        match session.drain().unwrap_err() {
            SessionError::Extractor { extractor, index, .. } => {
                assert_eq!(extractor, "flaky");
                assert!(index == 2 || index == 4);
            }
            other => panic!("unexpected error: {}", other),
        }
        session.drain().unwrap();
        assert_eq!(session.collector().len(), 4);
        session.close().unwrap();
    }

    #[test]
    fn test_concurrent_error_surfaces_from_pooled_score() {
        let failing = failing_descriptor("flaky", "flaky_value", &[1]);
        let model = LinearModel::new("flaky_model", 0.0).with_feature("flaky_value", 1.0);
        let mut session = Session::init(SessionConfig::new(3, 1), registry_with(vec![failing])).unwrap();
        session.use_features_from_model(&model).unwrap();
        for index in 0..3 {
            session.submit_frame_pair(test_picture(1), test_picture(1), index).unwrap();
        }

        let err = session.score_pooled(&model, PoolingMethod::Mean, 0, 3).unwrap_err();
        assert!(matches!(err, SessionError::Extractor { index: 1, .. }), "{}", err);
    }

    #[test]
    fn test_panicking_task_is_latched_and_context_returned() {
        let panicking = panicking_descriptor("unstable", "unstable_value", &[3]);
        let mut session = Session::init(SessionConfig::new(2, 1), registry_with(vec![panicking])).unwrap();
        session.use_feature("unstable").unwrap();
        for index in 0..6 {
            session.submit_frame_pair(test_picture(1), test_picture(1), index).unwrap();
        }

        let err = session.drain().unwrap_err();
        assert!(
            matches!(err, SessionError::TaskPanicked { index: 3, .. }),
            "unexpected error: {}",
            err
        );
        // The context came back to the pool, so finalization can close it.
        session.close().unwrap();
    }

    #[test]
    fn test_synchronous_error_aborts_rest_of_frame() {
        let failing = failing_descriptor("flaky", "flaky_value", &[1]);
        let (after, after_probe) = probed_descriptor("after", "after_value", ProbeOptions::default());
        let mut session = Session::init(SessionConfig::default(), registry_with(vec![failing, after])).unwrap();
        session.use_feature("flaky").unwrap();
        session.use_feature("after").unwrap();

        session.submit_frame_pair(test_picture(1), test_picture(1), 0).unwrap();
        let err = session
            .submit_frame_pair(test_picture(1), test_picture(1), 1)
            .unwrap_err();
        assert!(matches!(err, SessionError::Extractor { index: 1, .. }));
        // The session stays usable for later frames.
        session.submit_frame_pair(test_picture(1), test_picture(1), 2).unwrap();

        assert_eq!(after_probe.seen_sorted(), vec![0, 2]);
        assert!(!session.collector().contains("after_value", 1));
        session.close().unwrap();
    }

    #[test]
    fn test_unknown_feature_is_invalid_argument() {
        let mut session = Session::init(SessionConfig::default(), builtin()).unwrap();
        let err = session.use_feature("vif").unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(session.binding_count(), 0);
    }

    #[test]
    fn test_model_registration_stops_at_first_unknown_feature() {
        let model = LinearModel::new("partial", 0.0)
            .with_feature("psnr_y", 1.0)
            .with_feature("vif_scale0", 1.0)
            .with_feature("motion_score", 1.0);
        let mut session = Session::init(SessionConfig::default(), builtin()).unwrap();

        let err = session.use_features_from_model(&model).unwrap_err();
        assert!(err.is_invalid_argument());
        // Bindings made before the failure stay until close.
        assert_eq!(session.binding_names(), vec!["psnr"]);
        session.close().unwrap();
    }

    #[test]
    fn test_failed_context_creation_binds_nothing() {
        let mut session = Session::init(
            SessionConfig::default(),
            registry_with(vec![unbuildable_descriptor("broken", "broken_value")]),
        )
        .unwrap();
        let err = session.use_feature("broken").unwrap_err();
        assert!(matches!(err, SessionError::ExtractorInit { .. }));
        assert_eq!(session.binding_count(), 0);
    }

    #[test]
    fn test_finalization_closes_context_pool() {
        let mut session = Session::init(SessionConfig::new(2, 1), builtin()).unwrap();
        session.use_feature("psnr").unwrap();
        let (reference, distorted) = frame(0);
        session.submit_frame_pair(reference, distorted, 0).unwrap();

        let mut sink = Vec::new();
        session.write_output(&mut sink, &OutputFormat::Json).unwrap();
        // A second finalizing call is a no-op and still writes.
        let mut again = Vec::new();
        session.write_output(&mut again, &OutputFormat::Json).unwrap();
        assert_eq!(sink, again);

        let (reference, distorted) = frame(1);
        let err = session.submit_frame_pair(reference, distorted, 1).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!matches!(err, SessionError::Pool(PoolError::Closed)));
    }
}
