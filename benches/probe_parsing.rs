//! Benchmarks for probe and progress parsing
//!
//! Tests ffprobe JSON parsing, stream selection and ffmpeg `-progress` parsing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recodarr_av::probe::parse_ffprobe_json;
use recodarr_av::{parse_progress_chunk, SelectionPolicy};

/// Sample ffprobe JSON output for a simple file
const FFPROBE_SIMPLE: &str = r#"{
    "format": {
        "filename": "/movies/movie.mkv",
        "format_name": "matroska,webm",
        "duration": "7200.000000",
        "size": "15000000000"
    },
    "streams": [
        {
            "index": 0,
            "codec_type": "video",
            "codec_name": "hevc",
            "width": 3840,
            "height": 2160,
            "tags": {}
        },
        {
            "index": 1,
            "codec_type": "audio",
            "codec_name": "truehd",
            "channels": 8,
            "tags": {"language": "eng", "title": "TrueHD 7.1"}
        }
    ]
}"#;

/// Sample ffprobe JSON output for a multi-language release with interleaved streams
const FFPROBE_COMPLEX: &str = r#"{
    "format": {
        "filename": "/movies/anime_movie.mkv",
        "format_name": "matroska,webm",
        "duration": "6420.512000"
    },
    "streams": [
        {"index": 0, "codec_type": "video", "codec_name": "h264", "tags": {}},
        {"index": 1, "codec_type": "audio", "codec_name": "flac", "tags": {"language": "jpn"}},
        {"index": 2, "codec_type": "subtitle", "codec_name": "ass", "tags": {"language": "eng"}},
        {"index": 3, "codec_type": "audio", "codec_name": "ac3", "tags": {"language": "eng"}},
        {"index": 4, "codec_type": "subtitle", "codec_name": "ass", "tags": {"language": "eng", "title": "Signs"}},
        {"index": 5, "codec_type": "audio", "codec_name": "aac", "tags": {"language": "ger"}},
        {"index": 6, "codec_type": "subtitle", "codec_name": "hdmv_pgs_subtitle", "tags": {"language": "ger"}},
        {"index": 7, "codec_type": "attachment", "codec_name": "ttf", "tags": {"filename": "font.ttf"}},
        {"index": 8, "codec_type": "subtitle", "codec_name": "subrip"}
    ]
}"#;

/// One ffmpeg `-progress` block
const PROGRESS_BLOCK: &str = "frame=2400
fps=96.00
stream_0_0_q=-1.0
bitrate=4521.3kbits/s
total_size=56623104
out_time_us=100100000
out_time_ms=100100000
out_time=00:01:40.100000
dup_frames=0
drop_frames=0
speed=4.01x
progress=continue
";

fn bench_ffprobe_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("ffprobe_parsing");

    group.throughput(Throughput::Bytes(FFPROBE_SIMPLE.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("descriptor", "simple"),
        &FFPROBE_SIMPLE,
        |b, json| {
            b.iter(|| parse_ffprobe_json(black_box(json)).unwrap());
        },
    );

    group.throughput(Throughput::Bytes(FFPROBE_COMPLEX.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("descriptor", "complex"),
        &FFPROBE_COMPLEX,
        |b, json| {
            b.iter(|| parse_ffprobe_json(black_box(json)).unwrap());
        },
    );

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    let descriptor = parse_ffprobe_json(FFPROBE_COMPLEX).unwrap();
    let default_policy = SelectionPolicy::default();
    let japanese = SelectionPolicy {
        audio_languages: vec!["jpn".to_string()],
        subtitle_languages: vec!["eng".to_string()],
        ..Default::default()
    };

    group.bench_function("default_policy", |b| {
        b.iter(|| default_policy.select(black_box(&descriptor)));
    });

    group.bench_function("language_policy", |b| {
        b.iter(|| japanese.select(black_box(&descriptor)));
    });

    group.finish();
}

fn bench_progress_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("progress_parsing");

    group.throughput(Throughput::Bytes(PROGRESS_BLOCK.len() as u64));
    group.bench_function("block", |b| {
        b.iter(|| parse_progress_chunk(black_box(PROGRESS_BLOCK)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ffprobe_parsing,
    bench_selection,
    bench_progress_parsing
);
criterion_main!(benches);
