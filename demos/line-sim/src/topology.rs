use std::time::Duration;

use anyhow::{anyhow, bail, Context};

pub struct Link {
    pub id: u32,
    pub a: String,
    pub b: String,
    pub cost: u32,
}

pub struct Host {
    pub name: String,
    pub router: String,
    pub port: u32,
    pub cost: u32,
}

pub enum Scripted {
    LinkDown { at: Duration, link: u32 },
    LinkUp { at: Duration, link: Link },
    Send { at: Duration, router: String, port: u32, dst: String },
}

#[derive(Default)]
pub struct Topology {
    pub links: Vec<Link>,
    pub hosts: Vec<Host>,
    pub script: Vec<Scripted>,
    pub run_for: Option<Duration>,
}

impl Topology {
    pub fn routers(&self) -> Vec<String> {
        let mut routers: Vec<String> = self
            .links
            .iter()
            .flat_map(|l| [l.a.clone(), l.b.clone()])
            .chain(self.hosts.iter().map(|h| h.router.clone()))
            .collect();
        routers.sort();
        routers.dedup();
        routers
    }
}

fn num<T: std::str::FromStr>(word: Option<&&str>, what: &str, line: usize) -> anyhow::Result<T> {
    let word = word.ok_or_else(|| anyhow!("line {line}: missing {what}"))?;
    word.parse::<T>()
        .map_err(|_| anyhow!("line {line}: {what} should be a number, got {word}"))
}

fn word(word: Option<&&str>, what: &str, line: usize) -> anyhow::Result<String> {
    word.map(|w| w.to_string())
        .ok_or_else(|| anyhow!("line {line}: missing {what}"))
}

fn secs(word: Option<&&str>, line: usize) -> anyhow::Result<Duration> {
    let secs: f64 = num(word, "time", line)?;
    Duration::try_from_secs_f64(secs).with_context(|| format!("line {line}: bad time"))
}

/// Parses one directive per line:
///
/// ```text
/// link <id> <router> <router> <cost>
/// host <name> <router> <port> <cost>
/// down <secs> <link id>
/// up <secs> <id> <router> <router> <cost>
/// send <secs> <router> <port> <dst>
/// run <secs>
/// ```
pub fn parse(input: &str) -> anyhow::Result<Topology> {
    let mut topology = Topology::default();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.split('#').next().unwrap_or_default();
        let values: Vec<&str> = raw.split_whitespace().collect();
        let Some(kind) = values.first() else {
            continue;
        };
        let mut args = values[1..].iter();
        match *kind {
            "link" => topology.links.push(Link {
                id: num(args.next(), "link id", line)?,
                a: word(args.next(), "router", line)?,
                b: word(args.next(), "router", line)?,
                cost: num(args.next(), "cost", line)?,
            }),
            "host" => topology.hosts.push(Host {
                name: word(args.next(), "host name", line)?,
                router: word(args.next(), "router", line)?,
                port: num(args.next(), "port", line)?,
                cost: num(args.next(), "cost", line)?,
            }),
            "down" => topology.script.push(Scripted::LinkDown {
                at: secs(args.next(), line)?,
                link: num(args.next(), "link id", line)?,
            }),
            "up" => topology.script.push(Scripted::LinkUp {
                at: secs(args.next(), line)?,
                link: Link {
                    id: num(args.next(), "link id", line)?,
                    a: word(args.next(), "router", line)?,
                    b: word(args.next(), "router", line)?,
                    cost: num(args.next(), "cost", line)?,
                },
            }),
            "send" => topology.script.push(Scripted::Send {
                at: secs(args.next(), line)?,
                router: word(args.next(), "router", line)?,
                port: num(args.next(), "port", line)?,
                dst: word(args.next(), "destination", line)?,
            }),
            "run" => topology.run_for = Some(secs(args.next(), line)?),
            other => bail!("line {line}: unknown directive {other}"),
        }
    }
    Ok(topology)
}
