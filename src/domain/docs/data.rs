use super::{DocBlock, DocPage, DocSection};

pub static DOCS: [DocPage; 8] = [
    DocPage {
        slug: "installation",
        title: "Installation",
        lead: "Vetrina ships as a single binary. Build it once, point it at a config file, and the whole site is up.",
        sections: &[
            DocSection {
                id: "requirements",
                title: "Requirements",
                blocks: &[
                    DocBlock::Paragraph(
                        "Vetrina has no runtime dependencies beyond the binary itself. All page content, styles, and the syntax pack are embedded at build time, so the production host needs nothing but a port to listen on.",
                    ),
                    DocBlock::List(&[
                        "A stable Rust toolchain (edition 2024) to build from source.",
                        "Roughly 30 MB of disk for the release binary, syntax pack included.",
                        "Outbound HTTPS access if the newsletter signup is enabled.",
                    ]),
                ],
            },
            DocSection {
                id: "building",
                title: "Building from source",
                blocks: &[
                    DocBlock::Paragraph(
                        "Clone the repository and build the release profile. The build script prepares the embedded assets and dumps the syntax pack into the build output directory.",
                    ),
                    DocBlock::Code {
                        language: "bash",
                        code: r#"git clone https://github.com/xfyyzy/vetrina
cd vetrina
cargo build --release

./target/release/vetrina serve"#,
                    },
                ],
            },
            DocSection {
                id: "first-run",
                title: "First run",
                blocks: &[
                    DocBlock::Paragraph(
                        "With no configuration at all, the server binds 127.0.0.1:3000 and serves the full site. Pass overrides on the command line while you experiment.",
                    ),
                    DocBlock::Code {
                        language: "bash",
                        code: r#"vetrina serve --server-host 0.0.0.0 --server-port 8080 --log-level debug"#,
                    },
                    DocBlock::Paragraph(
                        "Probe `/healthz` to confirm the process is serving; it answers with a plain 200 and no body.",
                    ),
                ],
            },
        ],
    },
    DocPage {
        slug: "configuration",
        title: "Configuration",
        lead: "Settings are resolved from configuration files, then environment variables, then command-line flags, with later sources winning.",
        sections: &[
            DocSection {
                id: "precedence",
                title: "Precedence",
                blocks: &[
                    DocBlock::Paragraph(
                        "Vetrina loads `config/default` and then `vetrina` from the working directory (any format the config crate understands), merges an explicit `--config-file` if given, then applies `VETRINA__`-prefixed environment variables, and finally the serve flags.",
                    ),
                    DocBlock::List(&[
                        "`config/default.toml`, then `vetrina.toml` next to the binary.",
                        "Environment variables such as `VETRINA__SERVER__PORT`.",
                        "Command-line flags such as `--server-port`, which always win.",
                    ]),
                ],
            },
            DocSection {
                id: "file",
                title: "Configuration file",
                blocks: &[
                    DocBlock::Paragraph(
                        "A complete file covers five sections. Every key is optional; the values below are the defaults.",
                    ),
                    DocBlock::Code {
                        language: "toml",
                        code: r#"[server]
host = "127.0.0.1"
port = 3000
graceful_shutdown_seconds = 30

[logging]
level = "info"
json = false

[render]
theme = "base16-ocean.light"

[newsletter]
# subscribe_url = "https://example.us1.list-manage.com/subscribe/post-json?u=...&id=..."
timeout_seconds = 10
trust_remote_markup = true

[site]
# base_url = "https://vetrina.example.com""#,
                    },
                ],
            },
            DocSection {
                id: "environment",
                title: "Environment variables",
                blocks: &[
                    DocBlock::Paragraph(
                        "Nested keys use a double underscore as the separator. This is the usual shape for container deployments.",
                    ),
                    DocBlock::Code {
                        language: "bash",
                        code: r#"export VETRINA__SERVER__HOST=0.0.0.0
export VETRINA__SERVER__PORT=8080
export VETRINA__LOGGING__JSON=true
export VETRINA__NEWSLETTER__SUBSCRIBE_URL="https://example.us1.list-manage.com/subscribe/post-json?u=abc&id=def""#,
                    },
                ],
            },
        ],
    },
    DocPage {
        slug: "deployment",
        title: "Deployment",
        lead: "One binary, one port. A process supervisor and a reverse proxy are all a production deployment needs.",
        sections: &[
            DocSection {
                id: "systemd",
                title: "Running under systemd",
                blocks: &[
                    DocBlock::Code {
                        language: "ini",
                        code: r#"[Unit]
Description=Vetrina site server
After=network.target

[Service]
ExecStart=/usr/local/bin/vetrina serve
Environment=VETRINA__SERVER__PORT=8080
Environment=VETRINA__LOGGING__JSON=true
Restart=on-failure

[Install]
WantedBy=multi-user.target"#,
                    },
                    DocBlock::Paragraph(
                        "On SIGINT or SIGTERM the server stops accepting connections and drains in-flight requests within the configured `graceful_shutdown_seconds` window.",
                    ),
                ],
            },
            DocSection {
                id: "reverse-proxy",
                title: "Behind a reverse proxy",
                blocks: &[
                    DocBlock::Paragraph(
                        "Terminate TLS at the proxy and forward to the listener. Embedded assets are served with immutable cache headers, so the proxy can cache `/assets/` aggressively.",
                    ),
                    DocBlock::Code {
                        language: "nginx",
                        code: r#"server {
    listen 443 ssl;
    server_name vetrina.example.com;

    location / {
        proxy_pass http://127.0.0.1:8080;
        proxy_set_header Host $host;
    }
}"#,
                    },
                ],
            },
            DocSection {
                id: "observability",
                title: "Observability",
                blocks: &[
                    DocBlock::List(&[
                        "`/healthz` answers 200 while the process is serving; wire it to your uptime checks.",
                        "Set `logging.json = true` to emit structured logs for a collector.",
                        "Request handling, code rendering, and newsletter submissions publish counters through the `metrics` facade; install any compatible recorder.",
                    ]),
                ],
            },
        ],
    },
    DocPage {
        slug: "writing-pages",
        title: "Writing pages",
        lead: "Site content is Rust data, compiled in. Pages are plain structs, and fenced code goes through the same renderer as the landing showcase.",
        sections: &[
            DocSection {
                id: "content-model",
                title: "The content model",
                blocks: &[
                    DocBlock::Paragraph(
                        "Each documentation page is a static value: a slug, a title, a lead, and a list of sections made of paragraphs, lists, and code blocks. Editing content is editing source, which keeps review, history, and deployment in one pipeline.",
                    ),
                    DocBlock::Code {
                        language: "rust",
                        code: r#"DocPage {
    slug: "release-notes",
    title: "Release notes",
    lead: "What changed and when.",
    sections: &[DocSection {
        id: "latest",
        title: "Latest",
        blocks: &[DocBlock::Paragraph("Nothing yet.")],
    }],
}"#,
                    },
                ],
            },
            DocSection {
                id: "code-blocks",
                title: "Code blocks",
                blocks: &[
                    DocBlock::Paragraph(
                        "Code blocks name a language and carry the source verbatim. Trailing whitespace is trimmed once before tokenization; interior blank lines and indentation survive exactly. Documentation pages emit code as a flowing stream with explicit newlines, while the landing showcase wraps each line in its own container for per-line styling.",
                    ),
                    DocBlock::Paragraph(
                        "Unknown language names are not an error: lookup falls back from token to full name to file extension, and finally to plain text.",
                    ),
                ],
            },
        ],
    },
    DocPage {
        slug: "newsletter-setup",
        title: "Newsletter setup",
        lead: "The hero signup form posts to a Mailchimp-style list endpoint and projects the submission status reactively.",
        sections: &[
            DocSection {
                id: "endpoint",
                title: "Pointing at your list",
                blocks: &[
                    DocBlock::Paragraph(
                        "Set `newsletter.subscribe_url` to your list's `post-json` endpoint. While it is unset the form renders but submissions are rejected locally with a configuration error, so a fresh install never posts anywhere by accident.",
                    ),
                    DocBlock::Code {
                        language: "toml",
                        code: r#"[newsletter]
subscribe_url = "https://example.us1.list-manage.com/subscribe/post-json?u=abc123&id=def456"
timeout_seconds = 10"#,
                    },
                ],
            },
            DocSection {
                id: "messages",
                title: "Status messages",
                blocks: &[
                    DocBlock::Paragraph(
                        "List services prefix some replies with a numeric code, as in `0 - Already subscribed`. Vetrina splits on the first hyphen: when the prefix is exactly `0` only the remainder is shown, otherwise the whole message is shown. Messages are HTML-entity-decoded before display.",
                    ),
                    DocBlock::Paragraph(
                        "Decoded replies are rendered as markup, because list services embed links in them. The list service is the trust boundary here; if yours cannot be trusted, set `trust_remote_markup = false` and replies are scrubbed before display.",
                    ),
                ],
            },
            DocSection {
                id: "consent",
                title: "Consent",
                blocks: &[
                    DocBlock::Paragraph(
                        "The consent checkbox maps to a fixed GDPR merge field on the list; checked submits `\"Y\"`, unchecked submits an empty value. The field identifier is a named constant in the payload builder, not something collected from visitors.",
                    ),
                ],
            },
        ],
    },
    DocPage {
        slug: "thank-you",
        title: "Thank you",
        lead: "Vetrina exists because of the people who run it, break it, and report back.",
        sections: &[
            DocSection {
                id: "contributors",
                title: "Contributors",
                blocks: &[
                    DocBlock::Paragraph(
                        "Every deployment that files an issue, every pull request that trims a rough edge, and every subscriber who keeps up with releases makes the project better. Thank you.",
                    ),
                    DocBlock::List(&[
                        "Star the repository so others can find it.",
                        "Report anything that surprised you, even small things.",
                        "Subscribe on the landing page to hear about releases.",
                    ]),
                ],
            },
        ],
    },
    DocPage {
        slug: "licenses",
        title: "Licenses",
        lead: "Vetrina is BSD-2-Clause. The stacks it stands on carry their own permissive licenses.",
        sections: &[
            DocSection {
                id: "vetrina",
                title: "Vetrina",
                blocks: &[
                    DocBlock::Paragraph(
                        "The project is distributed under the BSD 2-Clause license. You may use, modify, and redistribute it, commercially or otherwise, as long as the license text travels with the source.",
                    ),
                ],
            },
            DocSection {
                id: "third-party",
                title: "Third-party notices",
                blocks: &[
                    DocBlock::List(&[
                        "axum, tokio, and tower (MIT) power the HTTP runtime.",
                        "askama (MIT/Apache-2.0) renders the templates.",
                        "syntect (MIT) and the two-face syntax collection drive code styling.",
                        "datastar (MIT) provides the reactive UI patches.",
                    ]),
                ],
            },
        ],
    },
    DocPage {
        slug: "resources",
        title: "Resources",
        lead: "Where to ask, what to read, and how to reach the maintainers.",
        sections: &[
            DocSection {
                id: "channels",
                title: "Channels",
                blocks: &[
                    DocBlock::List(&[
                        "Issues: https://github.com/xfyyzy/vetrina/issues for bugs and sharp edges.",
                        "Discussions: https://github.com/xfyyzy/vetrina/discussions for questions and ideas.",
                        "Releases: subscribe on the landing page for release notes.",
                    ]),
                    DocBlock::Paragraph(
                        "Responses are best-effort. Include your configuration (with secrets removed) and the `--log-level debug` output for anything behavioral.",
                    ),
                ],
            },
        ],
    },
];
