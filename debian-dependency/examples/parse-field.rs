use debian_dependency::{Dependency, ParseOptions};

pub fn main() {
    let mut args = std::env::args().skip(1);
    let (binary, text) = match args.next() {
        Some(flag) if flag == "--binary" => (true, args.collect::<Vec<_>>().join(" ")),
        Some(first) => (false, std::iter::once(first).chain(args).collect::<Vec<_>>().join(" ")),
        None => {
            eprintln!("usage: parse-field [--binary] FIELD-VALUE");
            std::process::exit(2);
        }
    };

    let options = if binary {
        ParseOptions::binary()
    } else {
        ParseOptions::default()
    };

    let dependency = match Dependency::parse_with(&text, &options) {
        Ok(dependency) => dependency,
        Err(e) => {
            eprintln!("{}", text);
            eprintln!("{}^", " ".repeat(text[..e.offset()].chars().count()));
            eprintln!("Failed to parse field: {}", e);
            std::process::exit(1);
        }
    };

    for (i, relation) in dependency.iter().enumerate() {
        println!("Relation {}:", i);
        for possibility in relation {
            if possibility.substvar {
                println!("  substvar {}", possibility.name);
                continue;
            }
            match &possibility.arch {
                Some(arch) => println!("  {} (arch qualifier {})", possibility.name, arch),
                None => println!("  {}", possibility.name),
            }
            if let Some(version) = &possibility.version {
                println!("    version {} {}", version.operator, version.number);
            }
            if let Some(set) = &possibility.architectures {
                let archs = set
                    .architectures
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>();
                println!(
                    "    {}architectures {}",
                    if set.not { "not " } else { "" },
                    archs.join(" ")
                );
            }
            for formula in &possibility.profiles {
                let terms = formula.iter().map(|t| t.to_string()).collect::<Vec<_>>();
                println!("    profiles <{}>", terms.join(" "));
            }
        }
    }
}
