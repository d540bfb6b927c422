mod device;
mod harness;
mod scenarios;
mod threads;
