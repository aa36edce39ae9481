use std::io;
use std::sync::mpsc::Sender;

use tracing::{error, info, warn};

use crate::applications::Application;
use crate::command::{CommandRunner, Invocation};
use crate::config::Settings;
use crate::report::ResultRecord;
use crate::return_codes::ReturnCodeTable;
use crate::sanitize::sanitize;

/// Runs the add → Publish-Imaging pipeline for each application of a batch.
pub struct Processor<'a, R> {
    settings: &'a Settings,
    runner: &'a R,
    codes: &'a ReturnCodeTable,
}

impl<'a, R: CommandRunner> Processor<'a, R> {
    pub fn new(settings: &'a Settings, runner: &'a R, codes: &'a ReturnCodeTable) -> Self {
        Self {
            settings,
            runner,
            codes,
        }
    }

    /// Processes `apps` in order, sending one record per application.
    /// Stops early only if the collector has gone away.
    pub fn process_batch(
        &self,
        batch_no: usize,
        apps: &[Application],
        results: &Sender<ResultRecord>,
    ) {
        let names = apps.iter().map(|a| a.name.as_str()).collect::<Vec<_>>();
        info!(batch = batch_no, "Executing batch: {:?}", names);

        for app in apps {
            let record = self.process(app);
            if results.send(record).is_err() {
                warn!(batch = batch_no, "result collector closed; abandoning rest of batch");
                return;
            }
        }
        info!(batch = batch_no, "Batch finished");
    }

    /// Never fails: internal errors become a `Failed` record for the application.
    pub fn process(&self, app: &Application) -> ResultRecord {
        let name = sanitize(&app.name);
        let record = match self.submit(app, &name) {
            Ok(record) => record,
            Err(err) => {
                error!(application = %app.name, error = %err, "Error processing application");
                ResultRecord::failed(name, format!("Error processing application: {err}"))
            }
        };
        info!("{record}");
        record
    }

    fn submit(&self, app: &Application, name: &str) -> io::Result<ResultRecord> {
        let add = Invocation::add(self.settings, app, name);
        info!(
            "Executing command for Application-{} to run AIP Analysis: {}",
            name,
            add.display()
        );
        let outcome = self.codes.classify(self.runner.run(&add)?);
        if !outcome.is_success() {
            warn!(application = name, step = "add", code = ?outcome.code, "Application failed");
            return Ok(ResultRecord::failed(name, outcome.message));
        }

        let publish = Invocation::publish_imaging(self.settings, name);
        info!(
            "Executing command for Application-{} for Imaging upload: {}",
            name,
            publish.display()
        );
        let outcome = self.codes.classify(self.runner.run(&publish)?);
        if !outcome.is_success() {
            warn!(
                application = name,
                step = "publish-imaging",
                code = ?outcome.code,
                "Application failed"
            );
            return Ok(ResultRecord::failed(name, outcome.message));
        }

        info!("Application - {} processed successfully", name);
        Ok(ResultRecord::passed(name))
    }
}
