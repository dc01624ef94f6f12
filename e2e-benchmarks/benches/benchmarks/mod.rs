pub mod pipelinebench;
