//! Split command handler.
//!
//! Reads files, directories or stdin and prints their chunks.

use clap::{Args, ValueEnum};
use futures::stream::{self, StreamExt};
use ragkit_core::{config::AppConfig, AppError, AppResult};
use ragkit_splitter::{
    config::load_profile, ChunkConfig, ChunkIdGenerator, ChunkPipeline, ContentHashIdGenerator,
    Document, Metadata, NameBasedUuidGenerator, PipelineOutput, SplitDiagnostic,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use walkdir::WalkDir;

/// Label used for text read from stdin.
const STDIN_SOURCE: &str = "-";

/// Split documents into chunks
#[derive(Args, Debug)]
pub struct SplitCommand {
    /// Files or directories to split (reads stdin when none are given)
    pub paths: Vec<PathBuf>,

    /// Chunking profile to start from
    #[arg(long)]
    pub profile: Option<String>,

    /// Maximum chunk length in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters repeated between consecutive chunks
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Separator to try, most specific first (repeatable; accepts \n and \t)
    #[arg(long = "separator")]
    pub separators: Vec<String>,

    /// Split on a regular expression instead (no size bound)
    #[arg(long)]
    pub regex: Option<String>,

    /// How to derive chunk identifiers
    #[arg(long, value_enum, default_value_t = IdStrategy::None)]
    pub ids: IdStrategy,

    /// Skip inputs larger than this many bytes
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    pub max_bytes: u64,

    /// Output one JSON object per chunk
    #[arg(long)]
    pub json: bool,
}

/// Chunk identifier strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdStrategy {
    /// No identifiers
    None,
    /// SHA-256 of chunk text and metadata
    Hash,
    /// Name-based UUID of chunk text and metadata
    Uuid,
}

impl IdStrategy {
    fn generator(self) -> Option<Arc<dyn ChunkIdGenerator>> {
        match self {
            IdStrategy::None => None,
            IdStrategy::Hash => Some(Arc::new(ContentHashIdGenerator)),
            IdStrategy::Uuid => Some(Arc::new(NameBasedUuidGenerator::default())),
        }
    }
}

/// One line of `--json` output.
#[derive(Serialize)]
struct ChunkRecord<'a> {
    source: &'a str,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    text: &'a str,
    metadata: &'a Metadata,
}

/// `--json` line reporting a non-fatal splitting condition.
#[derive(Serialize)]
struct DiagnosticRecord<'a> {
    source: &'a str,
    #[serde(flatten)]
    diagnostic: &'a SplitDiagnostic,
}

/// Running totals for the final log line.
#[derive(Debug, Default)]
struct Summary {
    inputs: usize,
    chunks: usize,
    oversized: usize,
}

impl SplitCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing split command");
        tracing::debug!("Split options: {:?}", self);

        let profile = self
            .profile
            .as_deref()
            .or(config.profile.as_deref())
            .unwrap_or("default");
        let chunk_config = self.apply_overrides(load_profile(&config.workspace, profile)?);

        let mut pipeline = ChunkPipeline::new(chunk_config)?;
        if let Some(ids) = self.ids.generator() {
            pipeline = pipeline.with_id_generator(ids);
        }
        let pipeline = Arc::new(pipeline);

        let mut summary = Summary::default();
        let mut emit = |source: &str, output: PipelineOutput| -> AppResult<()> {
            summary.inputs += 1;
            summary.chunks += output.chunks.len();
            summary.oversized += output.diagnostics.len();
            if self.json {
                write_json(&mut std::io::stdout().lock(), source, &output)
            } else {
                print_text(source, &output);
                Ok(())
            }
        };

        if self.paths.is_empty() {
            let output = self.split_stdin(&pipeline).await?;
            emit(STDIN_SOURCE, output)?;
        } else {
            self.split_files(&pipeline, |source, output| emit(&source, output))
                .await?;
        }

        tracing::info!(
            "Split {} inputs into {} chunks ({} oversized)",
            summary.inputs,
            summary.chunks,
            summary.oversized
        );

        Ok(())
    }

    /// Layer command-line settings over the profile.
    fn apply_overrides(&self, mut chunk_config: ChunkConfig) -> ChunkConfig {
        if let Some(size) = self.chunk_size {
            chunk_config.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            chunk_config.chunk_overlap = overlap;
        }
        if !self.separators.is_empty() {
            chunk_config.separators =
                Some(self.separators.iter().map(|s| unescape_separator(s)).collect());
        }
        if let Some(ref regex) = self.regex {
            chunk_config.regex = Some(regex.clone());
        }
        chunk_config
    }

    async fn split_stdin(&self, pipeline: &Arc<ChunkPipeline>) -> AppResult<PipelineOutput> {
        let text = read_limited(tokio::io::stdin(), self.max_bytes).await?;
        let document = Document::new(text).metadata_entry("source", STDIN_SOURCE);
        run_pipeline(Arc::clone(pipeline), document, None).await
    }

    /// Split input files a few at a time, handing each result to `emit` in
    /// input order as soon as it and its predecessors are done.
    async fn split_files<F>(&self, pipeline: &Arc<ChunkPipeline>, mut emit: F) -> AppResult<()>
    where
        F: FnMut(String, PipelineOutput) -> AppResult<()>,
    {
        let files = collect_files(&self.paths);
        tracing::debug!("Collected {} input files", files.len());

        let tasks = files.into_iter().map(|path| {
            let pipeline = Arc::clone(pipeline);
            let max_bytes = self.max_bytes;
            async move {
                let source = path.display().to_string();
                match read_input(&path, max_bytes).await {
                    Some(text) => {
                        let document =
                            Document::new(text).metadata_entry("source", source.clone());
                        let output = run_pipeline(pipeline, document, Some(path)).await?;
                        Ok::<_, AppError>(Some((source, output)))
                    }
                    None => Ok(None),
                }
            }
        });

        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let mut results = stream::iter(tasks).buffered(concurrency);
        while let Some(result) = results.next().await {
            if let Some((source, output)) = result? {
                emit(source, output)?;
            }
        }
        Ok(())
    }
}

/// Run the pipeline on the blocking pool.
async fn run_pipeline(
    pipeline: Arc<ChunkPipeline>,
    document: Document,
    path: Option<PathBuf>,
) -> AppResult<PipelineOutput> {
    tokio::task::spawn_blocking(move || pipeline.process(&document, path.as_deref()))
        .await
        .map_err(|e| AppError::Other(format!("Split task failed: {}", e)))?
}

/// Read at most `max_bytes` of UTF-8 text, failing once the limit is passed.
async fn read_limited<R>(reader: R, max_bytes: u64) -> AppResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;

    if bytes.len() as u64 > max_bytes {
        return Err(AppError::Split(format!(
            "stdin input exceeds --max-bytes {}",
            max_bytes
        )));
    }

    String::from_utf8(bytes)
        .map_err(|e| AppError::Split(format!("stdin input is not valid UTF-8: {}", e)))
}

/// Read a file as UTF-8, skipping (with a warning) anything unreadable or too large.
async fn read_input(path: &Path, max_bytes: u64) -> Option<String> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > max_bytes => {
            tracing::warn!(
                "Skipping {:?}: {} bytes exceeds --max-bytes {}",
                path,
                meta.len(),
                max_bytes
            );
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("Skipping {:?}: {}", path, e);
            return None;
        }
    }

    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!("Skipping {:?}: {}", path, e);
            None
        }
    }
}

/// Expand directories into their files, skipping hidden entries.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
                .filter_map(|e| e.ok());

            for entry in walker {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

/// Translate `\n`, `\r`, `\t` and `\\` escapes typed on the command line.
pub(crate) fn unescape_separator(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

/// One JSON object per chunk, then one per diagnostic.
fn write_json(out: &mut impl Write, source: &str, output: &PipelineOutput) -> AppResult<()> {
    for (index, chunk) in output.chunks.iter().enumerate() {
        let record = ChunkRecord {
            source,
            index,
            id: chunk.id.as_deref(),
            text: &chunk.text,
            metadata: &chunk.metadata,
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
    }
    for diagnostic in &output.diagnostics {
        serde_json::to_writer(&mut *out, &DiagnosticRecord { source, diagnostic })?;
        writeln!(out)?;
    }
    Ok(())
}

fn print_text(source: &str, output: &PipelineOutput) {
    println!(
        "==> {} ({:?}, {} chunks)",
        source,
        output.content_type,
        output.chunks.len()
    );
    for (index, chunk) in output.chunks.iter().enumerate() {
        match chunk.id {
            Some(ref id) => println!("--- chunk {} [{}] ({} chars)", index, id, chunk.char_count()),
            None => println!("--- chunk {} ({} chars)", index, chunk.char_count()),
        }
        println!("{}", chunk.text);
    }
    for diagnostic in &output.diagnostics {
        eprintln!("warning: {}: {}", source, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        split: SplitCommand,
    }

    fn parse(args: &[&str]) -> SplitCommand {
        let mut argv = vec!["ragkit"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).split
    }

    #[test]
    fn test_unescape_separator() {
        assert_eq!(unescape_separator(r"\n\n"), "\n\n");
        assert_eq!(unescape_separator(r"\t"), "\t");
        assert_eq!(unescape_separator(r". "), ". ");
        assert_eq!(unescape_separator(r"a\\b"), r"a\b");
        assert_eq!(unescape_separator(r"\x"), r"\x");
        assert_eq!(unescape_separator(""), "");
    }

    #[test]
    fn test_apply_overrides() {
        let cmd = parse(&[
            "--chunk-size",
            "120",
            "--chunk-overlap",
            "12",
            "--separator",
            r"\n",
            "--separator",
            "",
        ]);
        let config = cmd.apply_overrides(ChunkConfig::default());

        assert_eq!(config.chunk_size, 120);
        assert_eq!(config.chunk_overlap, 12);
        assert_eq!(config.separators, Some(vec!["\n".to_string(), String::new()]));
        assert!(config.regex.is_none());
    }

    #[test]
    fn test_overrides_keep_profile_values() {
        let cmd = parse(&["--ids", "hash"]);
        let profile = ChunkConfig {
            chunk_size: 64,
            chunk_overlap: 8,
            separators: Some(vec![" ".to_string()]),
            regex: None,
        };

        assert_eq!(cmd.apply_overrides(profile.clone()), profile);
        assert_eq!(cmd.ids, IdStrategy::Hash);
        assert!(cmd.ids.generator().is_some());
        assert!(IdStrategy::None.generator().is_none());
    }

    #[test]
    fn test_collect_files_skips_hidden() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        std::fs::write(temp.path().join("a.md"), "a").unwrap();
        std::fs::create_dir_all(temp.path().join(".ragkit")).unwrap();
        std::fs::write(temp.path().join(".ragkit/config.yaml"), "x").unwrap();

        let files = collect_files(&[temp.path().to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
    }

    #[tokio::test]
    async fn test_split_files_in_order() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.txt");
        let second = temp.path().join("second.txt");
        std::fs::write(&first, "alpha beta gamma delta").unwrap();
        std::fs::write(&second, "short").unwrap();

        let cmd = parse(&[
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "--chunk-size",
            "12",
            "--chunk-overlap",
            "0",
        ]);
        let pipeline = Arc::new(ChunkPipeline::new(cmd.apply_overrides(ChunkConfig::default())).unwrap());

        let mut results = Vec::new();
        cmd.split_files(&pipeline, |source, output| {
            results.push((source, output));
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, first.display().to_string());

        let texts: Vec<&str> = results[0].1.chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta"]);
        assert_eq!(results[1].1.chunks[0].text, "short");
        assert_eq!(
            results[1].1.chunks[0].metadata["source"],
            second.display().to_string()
        );
    }

    #[tokio::test]
    async fn test_oversized_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let big = temp.path().join("big.txt");
        std::fs::write(&big, "x".repeat(64)).unwrap();

        assert!(read_input(&big, 16).await.is_none());
        assert_eq!(read_input(&big, 64).await.map(|t| t.len()), Some(64));
        assert!(read_input(&temp.path().join("missing.txt"), 64).await.is_none());
    }

    #[tokio::test]
    async fn test_split_files_stops_on_emit_error() {
        let temp = TempDir::new().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            std::fs::write(temp.path().join(name), name).unwrap();
        }

        let cmd = parse(&[temp.path().to_str().unwrap()]);
        let pipeline = Arc::new(ChunkPipeline::new(ChunkConfig::default()).unwrap());

        let mut seen = Vec::new();
        let result = cmd
            .split_files(&pipeline, |source, _| {
                seen.push(source);
                Err(AppError::Other("stdout closed".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with("a.txt"));
    }

    #[tokio::test]
    async fn test_read_limited_rejects_input_over_limit() {
        let text = read_limited(&b"hello"[..], 5).await.unwrap();
        assert_eq!(text, "hello");

        let err = read_limited(&b"hello!"[..], 5).await.unwrap_err();
        assert!(matches!(err, AppError::Split(_)));

        assert!(read_limited(&b"\xff\xfe"[..], 5).await.is_err());
    }

    #[test]
    fn test_json_output_includes_diagnostics() {
        let pipeline = ChunkPipeline::new(ChunkConfig {
            chunk_size: 10,
            chunk_overlap: 0,
            separators: Some(vec![" ".to_string()]),
            regex: None,
        })
        .unwrap();
        let document = Document::new(format!("tiny {}", "z".repeat(12)));
        let output = pipeline.process(&document, None).unwrap();

        let mut buffer = Vec::new();
        write_json(&mut buffer, "notes.txt", &output).unwrap();
        let lines: Vec<serde_json::Value> = String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["text"], "tiny");
        assert_eq!(lines[1]["index"], 1);
        assert_eq!(
            lines[2],
            serde_json::json!({
                "source": "notes.txt",
                "kind": "oversized_chunk",
                "index": 1,
                "length": 12,
                "chunk_size": 10
            })
        );
    }
}
