use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use dab::fig::FIB_SIZE;
use dab::time::DateTime;
use dab::{EnsembleId, FicDecoder, GateConfig, Label, MotHandler, Notifier, ServiceId};

#[derive(Debug)]
struct AppArgs {
    path: PathBuf,
    threshold: u8,
    show_components: bool,
    verbose: bool,
}

impl AppArgs {
    const HELP: &str = "\
FIBのダンプからアンサンブルとサービスの情報を表示するコマンド

USAGE:
  services [OPTIONS] [PATH]

FLAGS:
  -h, --help          このヘルプを表示する
  -v, --verbose       受信中の通知を表示する
  --show-components   サービスコンポーネントとサブチャンネルを表示する

OPTIONS:
  --threshold <N>     サービスを登録する受信回数（既定値は2）

ARGS:
  <PATH>              CRC検査済みの32バイトのFIBを連結したファイルのパス
";

    pub fn parse() -> Result<AppArgs, Box<dyn std::error::Error>> {
        let mut args = pico_args::Arguments::from_env();

        if args.contains(["-h", "--help"]) {
            println!("{}", Self::HELP);
            std::process::exit(0);
        }

        let verbose = args.contains(["-v", "--verbose"]);
        let show_components = args.contains("--show-components");
        let threshold = args.opt_value_from_str("--threshold")?.unwrap_or(2);

        Ok(AppArgs {
            path: args.free_from_str()?,
            threshold,
            show_components,
            verbose,
        })
    }
}

struct Printer {
    verbose: bool,
}

impl Notifier for Printer {
    fn on_new_ensemble(&self, id: EnsembleId) {
        if self.verbose {
            println!("アンサンブル {}", id);
        }
    }

    fn on_service_detected(&self, id: ServiceId) {
        if self.verbose {
            println!("サービス検出 {}", id);
        }
    }

    fn on_set_ensemble_label(&self, label: &Label) {
        if self.verbose {
            println!("アンサンブル名 {}", label.text());
        }
    }

    fn on_set_service_label(&self, id: ServiceId, label: &Label) {
        if self.verbose {
            println!("サービス名 {} {}", id, label.text());
        }
    }

    fn on_date_time_update(&self, date_time: &DateTime) {
        if self.verbose {
            println!("日時 {}", date_time.local());
        }
    }
}

impl MotHandler for Printer {
    fn handle_mot_data_group(&self, data: Vec<u8>) {
        if self.verbose {
            println!("スライドショー {}バイト", data.len());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = AppArgs::parse()?;

    env_logger::init();

    let f = File::open(&*args.path)?;
    let mut f = BufReader::with_capacity(FIB_SIZE * 1024, f);

    let config = GateConfig {
        admit_threshold: args.threshold,
        ..Default::default()
    };
    let printer = Printer {
        verbose: args.verbose,
    };
    let decoder = FicDecoder::with_config(printer, (), config);

    let mut fib = [0; FIB_SIZE];
    loop {
        match f.read_exact(&mut fib) {
            Ok(()) => decoder.process_fib(&fib),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }

    let ensemble = decoder.ensemble();
    match ensemble.id() {
        Some(id) => print!("{} {}", id, ensemble.label().text()),
        None => print!("(不明なアンサンブル)"),
    }
    if let Some(ecc) = ensemble.ecc() {
        print!(" ECC={:02X}", ecc);
    }
    if let Some(dt) = ensemble.date_time() {
        print!(" {}", dt.local());
    }
    println!();

    for svc in decoder.services() {
        // サービス識別とサービス名
        print!("  {} {}", svc.id(), svc.label().text());
        if let Some(pty) = svc.programme_type() {
            print!(" [{}]", pty);
        }
        println!();

        if !args.show_components {
            continue;
        }
        for component in svc.components() {
            print!(
                "    #{} {:?}{}",
                component.number(),
                component.transport(),
                if component.is_primary() { " (主)" } else { "" },
            );
            if !component.label().is_empty() {
                print!(" {}", component.label().text());
            }
            let sub = decoder.subchannel(component);
            if sub.is_used() {
                print!(
                    " 開始={}CU 大きさ={}CU {}",
                    sub.start_address(),
                    sub.size(),
                    sub.protection(),
                );
                if let Some(bitrate) = sub.bitrate() {
                    print!(" {}kbps", bitrate);
                }
            }
            println!();
        }
    }

    Ok(())
}
