use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use direct_response::admission::{default_scheme, ValidationOptions};
use direct_response::api::v1alpha1::crd;
use direct_response::manifest;

#[derive(Parser)]
#[command(name = "drr-cli")]
#[command(about = "Tooling for DirectResponseRoute resources", long_about = None)]
struct Cli {
    /// Webhook base URL.
    #[arg(short, long, default_value = "https://localhost:9443")]
    url: String,

    /// Accept self-signed webhook certificates.
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CustomResourceDefinition
    Crd,
    /// Validate manifest files locally
    Validate {
        /// YAML or JSON manifests
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum body length in bytes
        #[arg(long)]
        max_body_bytes: Option<usize>,
    },
    /// Send the first object of a manifest to a running webhook
    Review {
        file: PathBuf,

        /// Review as an UPDATE instead of a CREATE
        #[arg(long)]
        update: bool,
    },
    /// Check webhook status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crd => {
            print!("{}", crd::crd_yaml()?);
        }
        Commands::Validate { files, max_body_bytes } => {
            let options = ValidationOptions { max_body_bytes };
            if !validate_files(&files, &options) {
                std::process::exit(1);
            }
        }
        Commands::Review { file, update } => {
            let object = manifest::read_documents(&file)?
                .into_iter()
                .next()
                .ok_or("manifest contains no documents")?;
            let operation = if update { "UPDATE" } else { "CREATE" };

            let res = client(cli.insecure)?
                .post(format!("{}/validate", cli.url))
                .json(&admission_review(object, operation))
                .send()
                .await?;
            let review = print_response(res).await?;
            if !admitted(&review) {
                std::process::exit(1);
            }
        }
        Commands::Status => {
            let res = client(cli.insecure)?
                .get(format!("{}/status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Validate every document of every file. Returns whether all were admitted.
fn validate_files(files: &[PathBuf], options: &ValidationOptions) -> bool {
    let scheme = default_scheme();
    let mut all_valid = true;

    for file in files {
        let documents = match manifest::read_documents(file) {
            Ok(documents) => documents,
            Err(e) => {
                eprintln!("{}: {}", file.display(), e);
                all_valid = false;
                continue;
            }
        };

        for (index, document) in documents.into_iter().enumerate() {
            let label = describe(&document);
            match scheme.admit(document, options) {
                Ok(objects) => println!("{}[{}] {}: valid ({} object(s))", file.display(), index, label, objects.len()),
                Err(e) => {
                    all_valid = false;
                    println!("{}[{}] {}: {}", file.display(), index, label, e);
                }
            }
        }
    }

    all_valid
}

fn describe(object: &Value) -> String {
    let kind = object["kind"].as_str().unwrap_or("<no kind>");
    let name = object["metadata"]["name"].as_str().unwrap_or("<unnamed>");
    match object["metadata"]["namespace"].as_str() {
        Some(namespace) => format!("{kind} {namespace}/{name}"),
        None => format!("{kind} {name}"),
    }
}

fn admission_review(object: Value, operation: &str) -> Value {
    let api_version = object["apiVersion"].as_str().unwrap_or_default();
    let (group, version) = api_version.rsplit_once('/').unwrap_or(("", api_version));
    let kind = object["kind"].as_str().unwrap_or_default();
    let plural = format!("{}s", kind.to_lowercase());

    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uuid::Uuid::new_v4().to_string(),
            "kind": { "group": group, "version": version, "kind": kind },
            "resource": { "group": group, "version": version, "resource": plural },
            "name": object["metadata"]["name"],
            "namespace": object["metadata"]["namespace"],
            "operation": operation,
            "userInfo": { "username": "drr-cli" },
            "object": object,
            "dryRun": true,
        }
    })
}

fn client(insecure: bool) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(insecure)
        .build()
}

/// Whether a returned AdmissionReview allows the object.
fn admitted(review: &Value) -> bool {
    review["response"]["allowed"].as_bool().unwrap_or(false)
}

/// Print a JSON response; a non-2xx status is an error.
async fn print_response(res: reqwest::Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("webhook returned status {status}: {text}").into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admitted_reads_verdict() {
        assert!(admitted(&json!({"response": {"uid": "a", "allowed": true}})));
        assert!(!admitted(&json!({"response": {"uid": "a", "allowed": false}})));
        assert!(!admitted(&json!({"kind": "AdmissionReview"})));
    }

    #[test]
    fn test_review_request_carries_object_type() {
        let review = admission_review(
            json!({
                "apiVersion": "gateway.gloo.solo.io/v1alpha1",
                "kind": "DirectResponseRoute",
                "metadata": { "name": "ok", "namespace": "default" },
                "spec": { "code": 200, "body": "ok" }
            }),
            "UPDATE",
        );
        assert_eq!(review["request"]["kind"]["group"], "gateway.gloo.solo.io");
        assert_eq!(review["request"]["kind"]["version"], "v1alpha1");
        assert_eq!(review["request"]["resource"]["resource"], "directresponseroutes");
        assert_eq!(review["request"]["operation"], "UPDATE");
    }
}
