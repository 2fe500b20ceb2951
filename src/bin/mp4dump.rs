use clap::{ArgAction, Parser};
use mp4nav::{
    boxes::{BoxRef, FourCC, NodeKind},
    diag::{LogSink, format_header},
    get_boxes,
    registry::default_registry,
    stream::{BoxStream, ReadStream, SeekStream},
    walk::{WalkOptions, Walker},
};
use std::fs::File;
use std::io;

#[derive(Parser, Debug)]
#[command(version, about = "Walk the box tree of an MP4/QuickTime file")]
struct Args {
    /// MP4/ISOBMFF file path, or - for stdin
    path: String,

    /// Only print subtree(s) matching a dotted path (e.g. moov.trak[0].mdia.minf.stbl)
    #[arg(long = "filter")]
    filter: Option<String>,

    /// Limit recursion depth
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Print decoded values when a decoder exists
    #[arg(long, action = ArgAction::SetTrue)]
    decode: bool,

    /// Log every skipped byte (RUST_LOG=mp4nav=trace to see it)
    #[arg(long, action = ArgAction::SetTrue)]
    trace_skips: bool,

    /// Keep going after a malformed container, skipping just that container
    #[arg(long, action = ArgAction::SetTrue)]
    lenient: bool,

    /// Emit JSON instead of human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

impl Args {
    fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: self.max_depth,
            decode: self.decode,
            trace_skips: self.trace_skips,
            lenient: self.lenient,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.path == "-" {
        let stdin = io::stdin();
        run(&mut ReadStream::new(stdin.lock()), &args)
    } else {
        let f = File::open(&args.path)?;
        run(&mut SeekStream::new(f)?, &args)
    }
}

fn run<S: BoxStream>(s: &mut S, args: &Args) -> anyhow::Result<()> {
    let mut sink = LogSink;

    // JSON mode: output JSON and exit
    if args.json {
        let boxes = get_boxes(s, args.walk_options(), &mut sink)?;
        println!("{}", serde_json::to_string_pretty(&boxes)?);
        return Ok(());
    }

    let reg = default_registry();
    let top = Walker::new(&reg, &mut sink, args.walk_options()).walk(s)?;

    let targets: Vec<&BoxRef> = if let Some(path) = &args.filter {
        select_by_path(&top, path)
    } else {
        top.iter().collect()
    };

    for b in targets {
        print_box(b, 0);
    }
    Ok(())
}

// ---------- Human-readable tree ----------

fn print_box(b: &BoxRef, depth: usize) {
    let line = format_header(&b.hdr, depth);
    match &b.kind {
        NodeKind::FullBox { version, flags, .. } => {
            println!("{line} (ver={}, flags=0x{:06x})", version, flags);
        }
        NodeKind::Leaf { .. } => println!("{line}"),
        NodeKind::Unknown { .. } => println!("{line} (unknown)"),
        NodeKind::Abandoned { reason } => println!("{line} (abandoned: {reason})"),
        NodeKind::DepthLimited => println!("{line} (container, not walked)"),
        NodeKind::Container(children) => {
            println!("{line} (container)");
            for c in children {
                print_box(c, depth + 1);
            }
        }
    }
    if let Some(v) = &b.decoded {
        println!("{}  -> {}", "  ".repeat(depth), v);
    }
}

// ---------- Filter path: moov.trak[0].mdia.minf.stbl ----------

fn select_by_path<'a>(roots: &'a [BoxRef], path: &str) -> Vec<&'a BoxRef> {
    let mut current: Vec<&'a BoxRef> = Vec::new();

    for (depth, seg) in path.split('.').enumerate() {
        let (name, idx) = parse_segment(seg);
        let fourcc = FourCC::from_str(name).unwrap_or(FourCC(*b"????"));

        let pools: Vec<&'a [BoxRef]> = if depth == 0 {
            vec![roots]
        } else {
            current.iter().map(|b| b.children()).collect()
        };

        let mut next = Vec::new();
        for pool in pools {
            let mut matches: Vec<&BoxRef> = pool.iter().filter(|b| b.hdr.typ == fourcc).collect();
            match idx {
                Some(i) if i < matches.len() => next.push(matches[i]),
                Some(_) => {}
                None => next.append(&mut matches),
            }
        }

        current = next;
        if current.is_empty() {
            break;
        }
    }

    current
}

fn parse_segment(seg: &str) -> (&str, Option<usize>) {
    if let Some(l) = seg.find('[') {
        let name = &seg[..l];
        if let Some(r) = seg[l + 1..].find(']') {
            let idx_str = &seg[l + 1..l + 1 + r];
            let idx = idx_str.parse::<usize>().ok();
            return (name, idx);
        }
        (name, None)
    } else {
        (seg, None)
    }
}
