//! End-to-end checksum sessions

use framesum::checksum::{digest, digest_file};
use framesum::types::FramePlane;
use framesum::{
    ChecksumAlgorithm, ChecksumSink, CropRegion, Frame, FrameFormat, RawFrameReader,
    SessionConfig, SinkState, VideoInfo,
};

fn ramp_frame(width: u32, height: u32, format: FrameFormat, seed: u8) -> Frame {
    let mut frame = Frame::new(width, height, format);
    for (i, plane) in frame.planes.iter_mut().enumerate() {
        for (j, byte) in plane.data.iter_mut().enumerate() {
            *byte = seed.wrapping_add((i * 31 + j) as u8);
        }
    }
    frame
}

#[test]
fn gray_zero_frame_md5() {
    let mut sink = ChecksumSink::new(SessionConfig::default());
    sink.start().unwrap();
    sink.set_format(VideoInfo::new(FrameFormat::Gray8, 4, 2)).unwrap();

    let report = sink.render(&Frame::new(4, 2, FrameFormat::Gray8)).unwrap();
    assert_eq!(
        report.frame_checksum.as_deref(),
        Some("7dea362b3fac8e00956a4952a3d4f474")
    );
    assert_eq!(report.to_string(), "FrameChecksum 7dea362b3fac8e00956a4952a3d4f474\n");

    let summary = sink.stop().unwrap();
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.file_checksum, None);
}

#[test]
fn i420_planes_then_frame() {
    let config = SessionConfig::default().with_plane_checksum(true);
    let mut sink = ChecksumSink::new(config);
    sink.start().unwrap();
    sink.set_caps("I420", 4, 4).unwrap();

    let mut frame = Frame::new(4, 4, FrameFormat::I420);
    frame.fill_plane(0, 0xFF);
    let report = sink.render(&frame).unwrap();

    let luma = digest(ChecksumAlgorithm::Md5, &[0xFF; 16]);
    let chroma = digest(ChecksumAlgorithm::Md5, &[0; 4]);
    let digests: Vec<&str> = report.digests().collect();
    assert_eq!(
        digests,
        vec![
            luma.as_str(),
            chroma.as_str(),
            chroma.as_str(),
            "144932bdda7b11f9c15da86713708d63",
        ]
    );
    assert_ne!(digests[0], digests[1]);
    sink.stop().unwrap();
}

#[test]
fn whole_file_checksum_matches_concatenation() {
    let config = SessionConfig::default()
        .with_hash(ChecksumAlgorithm::Sha256)
        .with_file_checksum(true);
    let mut sink = ChecksumSink::new(config);
    sink.start().unwrap();
    sink.set_format(VideoInfo::new(FrameFormat::Nv12, 6, 4)).unwrap();

    let temp_path = sink.raw_path().unwrap().to_path_buf();
    assert!(temp_path.exists());

    let mut concatenated = Vec::new();
    for seed in 0..5u8 {
        let frame = ramp_frame(6, 4, FrameFormat::Nv12, seed);
        for plane in &frame.planes {
            concatenated.extend_from_slice(&plane.data);
        }
        let report = sink.render(&frame).unwrap();
        assert_eq!(report.frame_checksum.unwrap().len(), 64);
    }

    let summary = sink.stop().unwrap();
    let file_checksum = summary.file_checksum.unwrap();
    assert_eq!(file_checksum, digest(ChecksumAlgorithm::Md5, &concatenated));
    assert_eq!(summary.raw_path, None);
    assert!(!temp_path.exists());
}

#[test]
fn dump_output_keeps_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.yuv");
    let config = SessionConfig::default()
        .with_dump_output(true)
        .with_file_checksum(true)
        .with_dump_location(&path);
    let mut sink = ChecksumSink::new(config);
    sink.start().unwrap();
    sink.set_format(VideoInfo::new(FrameFormat::Yv12, 5, 3)).unwrap();

    let mut expected = Vec::new();
    for seed in [3u8, 9] {
        let frame = ramp_frame(5, 3, FrameFormat::Yv12, seed);
        for plane in &frame.planes {
            expected.extend_from_slice(&plane.data);
        }
        sink.render(&frame).unwrap();
    }

    let summary = sink.stop().unwrap();
    assert_eq!(summary.raw_path.as_deref(), Some(path.as_path()));
    assert_eq!(std::fs::read(&path).unwrap(), expected);
    assert_eq!(
        summary.file_checksum.unwrap(),
        digest_file(ChecksumAlgorithm::Md5, &path).unwrap()
    );
}

#[test]
fn dump_output_to_temporary_path() {
    let config = SessionConfig::default().with_dump_output(true);
    let mut sink = ChecksumSink::new(config);
    sink.start().unwrap();
    sink.set_format(VideoInfo::new(FrameFormat::Gray8, 2, 2)).unwrap();

    let mut frame = Frame::new(2, 2, FrameFormat::Gray8);
    frame.fill_plane(0, 0x42);
    sink.render(&frame).unwrap();

    let summary = sink.stop().unwrap();
    let path = summary.raw_path.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), vec![0x42; 4]);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn padded_and_cropped_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crop.yuv");
    let config = SessionConfig::default()
        .with_dump_output(true)
        .with_dump_location(&path);
    let mut sink = ChecksumSink::new(config);
    sink.start().unwrap();
    sink.set_format(VideoInfo::new(FrameFormat::I420, 4, 4)).unwrap();

    // 4x4 I420 stored with 8-byte luma and 4-byte chroma strides
    let y: Vec<u8> = (0..32).collect();
    let u: Vec<u8> = (100..108).collect();
    let v: Vec<u8> = (200..208).collect();
    let frame = Frame::from_planes(
        vec![
            FramePlane { data: y, stride: 8 },
            FramePlane { data: u, stride: 4 },
            FramePlane { data: v, stride: 4 },
        ],
        4,
        4,
        FrameFormat::I420,
    )
    .with_crop(CropRegion::new(1, 1, 3, 3));

    let report = sink.render(&frame).unwrap();
    sink.stop().unwrap();

    // luma rows 1..4, columns 1..4; chroma 2x2 starting at (0, 0)
    let expected = vec![
        9, 10, 11, 17, 18, 19, 25, 26, 27, //
        100, 101, 104, 105, //
        200, 201, 204, 205,
    ];
    assert_eq!(std::fs::read(&path).unwrap(), expected);
    assert_eq!(
        report.frame_checksum.unwrap(),
        digest(ChecksumAlgorithm::Md5, &expected)
    );
}

#[test]
fn raw_reader_feeds_sink() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.yuv");
    let info = VideoInfo::new(FrameFormat::P010, 4, 2);

    // Two frames with 12-byte luma and chroma strides (4 bytes of padding)
    let mut bytes = Vec::new();
    let mut packed = Vec::new();
    for frame in 0..2u8 {
        for row in 0..3u8 {
            let data: Vec<u8> = (0..8).map(|i| frame * 50 + row * 10 + i).collect();
            bytes.extend_from_slice(&data);
            bytes.extend_from_slice(&[0xEE; 4]);
            packed.extend_from_slice(&data);
        }
    }
    std::fs::write(&input, &bytes).unwrap();

    let reader = RawFrameReader::new(std::fs::File::open(&input).unwrap(), info)
        .with_strides(vec![12, 12])
        .unwrap();

    let mut sink = ChecksumSink::new(SessionConfig::default().with_file_checksum(true));
    sink.start().unwrap();
    sink.set_format(info).unwrap();
    for frame in reader {
        sink.render(&frame.unwrap()).unwrap();
    }
    assert_eq!(sink.state(), SinkState::Processing);

    let summary = sink.stop().unwrap();
    assert_eq!(summary.frames, 2);
    assert_eq!(
        summary.file_checksum.unwrap(),
        digest(ChecksumAlgorithm::Md5, &packed)
    );
}

#[test]
fn open_failure_keeps_sink_idle() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::default()
        .with_dump_output(true)
        .with_dump_location(dir.path().join("no").join("such").join("dir.yuv"));
    let mut sink = ChecksumSink::new(config);

    let err = sink.start().unwrap_err();
    assert!(err.is_session_fatal());
    assert_eq!(sink.state(), SinkState::Idle);
}
